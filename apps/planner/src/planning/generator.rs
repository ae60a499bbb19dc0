//! Plan generation: validated inputs + reference context → plan text.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::PlanGenerator;
use crate::planning::inputs::{LessonInputs, TeachingStyle};
use crate::planning::prompts::build_prompt;
use crate::planning::reference::{ReferenceContext, ReferenceStatus};

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    pub status: ReferenceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Generated plan returned to the client. `plan_text` is what the client later sends
/// back to the layout and export endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub plan_text: String,
    pub topic: String,
    pub course_name: String,
    pub teaching_style: TeachingStyle,
    pub model: String,
    pub reference: ReferenceSummary,
    pub generated_at: DateTime<Utc>,
}

/// Assembles the prompt and makes exactly one generation call.
pub async fn generate_plan(
    generator: &dyn PlanGenerator,
    inputs: &LessonInputs,
    reference: &ReferenceContext,
    timeout: Duration,
) -> Result<GeneratedPlan, AppError> {
    let prompt = build_prompt(inputs, &reference.text);
    info!(
        course = %inputs.course_name,
        style = %inputs.teaching_style,
        reference = ?reference.status,
        prompt_chars = prompt.len(),
        model = generator.model(),
        "Generating lesson plan"
    );

    let plan_text = generator.generate(&prompt, timeout).await?;
    info!(plan_chars = plan_text.len(), "Lesson plan generated");

    Ok(GeneratedPlan {
        plan_text,
        topic: inputs.topic().to_string(),
        course_name: inputs.course_name.clone(),
        teaching_style: inputs.teaching_style,
        model: generator.model().to_string(),
        reference: ReferenceSummary {
            status: reference.status,
            snippet: reference.snippet(),
        },
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::LlmError;
    use crate::planning::prompts::NO_PDF_CONTEXT;

    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        reply: Result<String, fn() -> LlmError>,
    }

    #[async_trait]
    impl PlanGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    fn inputs() -> LessonInputs {
        LessonInputs::validate("Databases", None, Some("SQL Primer"), "Normal forms - 1NF, 2NF")
            .unwrap()
    }

    fn no_pdf() -> ReferenceContext {
        ReferenceContext {
            status: ReferenceStatus::None,
            text: NO_PDF_CONTEXT.to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_plan_sends_one_prompt() {
        let generator = RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            reply: Ok("# Plan".to_string()),
        };
        let plan = generate_plan(&generator, &inputs(), &no_pdf(), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(plan.plan_text, "# Plan");
        assert_eq!(plan.topic, "Normal forms");
        assert_eq!(plan.model, "stub");
        assert!(plan.reference.snippet.is_none());
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("SQL Primer"));
    }

    #[tokio::test]
    async fn test_generate_plan_surfaces_timeout() {
        let generator = RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            reply: Err(|| LlmError::Timeout { secs: 1 }),
        };
        let err = generate_plan(&generator, &inputs(), &no_pdf(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamTimeout(_)));
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }
}
