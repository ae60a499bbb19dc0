// Prompt constants and assembly for lesson plan generation.

use crate::planning::inputs::LessonInputs;

/// Reference context when no PDF was uploaded.
pub const NO_PDF_CONTEXT: &str =
    "No PDF provided. The plan will be generated based on general knowledge.";

/// Reference context when an uploaded PDF yielded no text.
pub const UNREADABLE_PDF_CONTEXT: &str =
    "The reference document could not be read, so no reference material is available. \
    The plan will be generated based on general knowledge.";

/// Master lesson plan prompt. Placeholders: `{pdf_context}`, `{topic}`, `{course_name}`,
/// `{references}`, `{teacher_style}`, `{syllabus_extract}`.
pub const MASTER_PROMPT_TEMPLATE: &str = r#"
You are an expert instructional designer for a higher education institute. Your task is to create a detailed, ready-to-use lesson plan.

First, carefully review the provided 'Reference Document Context'. This is the primary source material. Base your lesson plan heavily on this content, citing specific examples or concepts from it where appropriate.

Then, use the 'Syllabus Extract' to understand the specific topic to focus on.

Finally, adhere strictly to the 'Lesson Plan Skeleton' and 'Customization Settings' to format your output.

---
### **REFERENCE DOCUMENT CONTEXT**
---
{pdf_context}

---
### **LESSON PLAN SKELETON**
---

**Topic:** {topic}
**Course:** {course_name}
**Duration:** 90 Minutes

**1. Learning Objectives:**
   - At the end of this lesson, students will be able to:
   - (Objective 1: Use action verbs like Define, Explain, Analyze, Apply, etc., based on the context)
   - (Objective 2)
   - (Objective 3)

**2. Pre-requisite Knowledge:**
   - (List 1-2 topics students should already know)

**3. Materials & Resources:**
   - Projector & Screen
   - Whiteboard & Markers
   - {references}
   - The provided reference document.

**4. Lesson Activities & Timeline (90 Mins):**
   *   **(0-10 mins) Introduction & Icebreaker:**
       - [Activity based on the teaching style: '{teacher_style}']

   *   **(10-40 mins) Core Concept Delivery:**
       - [Activity based on the teaching style: '{teacher_style}'. This is the main teaching part. Refer to specific concepts from the provided document.]

   *   **(40-60 mins) Interactive Activity / Case Study:**
       - [An activity to reinforce learning. Create a small case study or problem directly from the reference document.]

   *   **(60-80 mins) Group Discussion / Q&A:**
       - [A guided discussion prompt for students related to the document.]

   *   **(80-90 mins) Wrap-up & Summary:**
       - [Recap the key learning objectives and preview the next lesson.]

**5. Assessment & Evaluation:**
   - **Formative:** [How to check for understanding during the class.]
   - **Summative:** [A small take-home question or a hint for the final exam.]

**6. Teacher's Notes:**
   - [Any specific points for the teacher to remember from the document.]

---
### **CUSTOMIZATION & INPUT**
---

*   **Teaching Style:** "{teacher_style}"
*   **Syllabus Extract:** "{syllabus_extract}"

---

Now, generate the complete lesson plan.
"#;

/// Builds the final prompt from validated inputs and the reference context.
pub fn build_prompt(inputs: &LessonInputs, pdf_context: &str) -> String {
    fill_template(
        MASTER_PROMPT_TEMPLATE,
        &[
            ("pdf_context", pdf_context),
            ("topic", inputs.topic()),
            ("course_name", &inputs.course_name),
            ("references", &inputs.references),
            ("teacher_style", inputs.teaching_style.label()),
            ("syllabus_extract", &inputs.syllabus_extract),
        ],
    )
}

/// Replaces `{key}` placeholders in one pass, so braces inside substituted values
/// (PDF text, syllabus) are never expanded. Unknown placeholders are kept as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
