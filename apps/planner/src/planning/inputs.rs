//! Lesson inputs: the form fields a plan is generated from.

use std::fmt;
use std::str::FromStr;

use axum::extract::Multipart;
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;

/// Used when the references field is left empty.
pub const NO_REFERENCES: &str = "N/A";

// ────────────────────────────────────────────────────────────────────────────
// Teaching style
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeachingStyle {
    #[default]
    InteractiveHandsOn,
    LectureDiscussion,
    CaseStudyProblemBased,
    FlippedClassroom,
}

impl TeachingStyle {
    pub const ALL: [TeachingStyle; 4] = [
        TeachingStyle::InteractiveHandsOn,
        TeachingStyle::LectureDiscussion,
        TeachingStyle::CaseStudyProblemBased,
        TeachingStyle::FlippedClassroom,
    ];

    /// The wording inserted into the prompt.
    pub fn label(self) -> &'static str {
        match self {
            TeachingStyle::InteractiveHandsOn => "Interactive & Hands-on",
            TeachingStyle::LectureDiscussion => "Lecture & Discussion-Based",
            TeachingStyle::CaseStudyProblemBased => "Case-Study & Problem-Based",
            TeachingStyle::FlippedClassroom => "Flipped Classroom",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            TeachingStyle::InteractiveHandsOn => "interactive_hands_on",
            TeachingStyle::LectureDiscussion => "lecture_discussion",
            TeachingStyle::CaseStudyProblemBased => "case_study_problem_based",
            TeachingStyle::FlippedClassroom => "flipped_classroom",
        }
    }
}

impl fmt::Display for TeachingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the display label or the snake_case identifier, case-insensitively.
impl FromStr for TeachingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TeachingStyle::ALL
            .into_iter()
            .find(|style| {
                style.label().eq_ignore_ascii_case(wanted) || style.slug().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let labels: Vec<&str> = TeachingStyle::ALL.iter().map(|s| s.label()).collect();
                format!(
                    "unknown teaching_style '{wanted}' (expected one of: {})",
                    labels.join(", ")
                )
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validated inputs
// ────────────────────────────────────────────────────────────────────────────

/// Validated text inputs for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonInputs {
    pub course_name: String,
    pub teaching_style: TeachingStyle,
    pub references: String,
    pub syllabus_extract: String,
}

impl LessonInputs {
    /// Validates raw form values. Runs before any network or PDF work.
    pub fn validate(
        course_name: &str,
        teaching_style: Option<&str>,
        references: Option<&str>,
        syllabus_extract: &str,
    ) -> Result<Self, AppError> {
        if syllabus_extract.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a syllabus extract before generating.".to_string(),
            ));
        }
        if course_name.trim().is_empty() {
            return Err(AppError::Validation("course_name cannot be empty".to_string()));
        }

        let teaching_style = match teaching_style.map(str::trim) {
            None | Some("") => TeachingStyle::default(),
            Some(raw) => raw.parse().map_err(AppError::Validation)?,
        };

        let references = references
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(NO_REFERENCES)
            .to_string();

        Ok(LessonInputs {
            course_name: course_name.trim().to_string(),
            teaching_style,
            references,
            syllabus_extract: syllabus_extract.to_string(),
        })
    }

    /// Topic line of the plan: the syllabus text before the first `-`.
    pub fn topic(&self) -> &str {
        topic_from_syllabus(&self.syllabus_extract)
    }
}

pub fn topic_from_syllabus(syllabus: &str) -> &str {
    let trimmed = syllabus.trim();
    trimmed
        .split_once('-')
        .map_or(trimmed, |(head, _)| head)
        .trim()
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart form
// ────────────────────────────────────────────────────────────────────────────

/// Reference PDF upload as received.
#[derive(Debug, Clone)]
pub struct ReferenceUpload {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

/// Raw multipart form, before validation.
#[derive(Debug, Default)]
pub struct PlanForm {
    pub course_name: String,
    pub teaching_style: Option<String>,
    pub references: Option<String>,
    pub syllabus_extract: String,
    pub reference_pdf: Option<ReferenceUpload>,
}

impl PlanForm {
    /// Reads every field of a `multipart/form-data` body. Unknown fields are skipped;
    /// an empty file part counts as no upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = PlanForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "reference_pdf" => {
                    let filename = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read reference_pdf: {e}"))
                    })?;
                    if !bytes.is_empty() {
                        form.reference_pdf = Some(ReferenceUpload { filename, bytes });
                    }
                }
                "course_name" | "teaching_style" | "references" | "syllabus_extract" => {
                    let value = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read field '{name}': {e}"))
                    })?;
                    match name.as_str() {
                        "course_name" => form.course_name = value,
                        "teaching_style" => form.teaching_style = Some(value),
                        "references" => form.references = Some(value),
                        _ => form.syllabus_extract = value,
                    }
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    pub fn validate(&self) -> Result<LessonInputs, AppError> {
        LessonInputs::validate(
            &self.course_name,
            self.teaching_style.as_deref(),
            self.references.as_deref(),
            &self.syllabus_extract,
        )
    }
}
