// SPDX-License-Identifier: MIT

//! Prompt templates for the review passes
//!
//! Templates are plain text with two placeholders:
//! - `{focus}` - replaced by `Focus Area: <focus>\n`, or nothing without a focus
//! - `{resume}` - replaced by the (possibly truncated) resume text

use crate::adk::error::CriticError;
use crate::critic::task::TaskName;
use serde::{Deserialize, Serialize};

pub const FOCUS_PLACEHOLDER: &str = "{focus}";
pub const RESUME_PLACEHOLDER: &str = "{resume}";

/// Appended after a resume that was cut to the prompt limit
pub const TRUNCATION_MARKER: &str = "... [truncated]";

pub const APPRECIATION_TEMPLATE: &str = r#"**Appreciation Section**
Appreciate this resume, highlighting key strengths and positive aspects.

Resume Content:
{focus}{resume}

Provide:
1. 3 key strengths or positive aspects
2. Focus on experience and projects
3. Use Hinglish
Word limit: 100 words in 3 points, with the heading "Appreciation" at the top."#;

pub const ROAST_TEMPLATE: &str = r#"**Roast Section**
Roast this resume, providing constructive criticism with 3 key areas for improvement in Hinglish.

Resume Content:
{focus}{resume}

Provide:
1. 3 key areas for improvement
2. Specific examples of how to improve
3. Use Hinglish for a light-hearted tone
Word limit: 100 words, with the heading "Roast" at the top."#;

pub const FEEDBACK_TEMPLATE: &str = r#"**Feedback Section**
Provide professional feedback on this resume with suggestions for improvement in Hinglish.

Resume Content:
{focus}{resume}

Provide:
1. 3 actionable suggestions for improvement
2. Focus on areas such as formatting, wording, and presentation
3. Use Hinglish
Word limit: 100 words, with the heading "Feedback" at the top."#;

/// Optional per-task template overrides, as read from config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromptOverrides {
    pub appreciation: Option<String>,
    pub roast: Option<String>,
    pub feedback: Option<String>,
}

impl PromptOverrides {
    pub fn get(&self, task: TaskName) -> Option<&str> {
        match task {
            TaskName::Appreciation => self.appreciation.as_deref(),
            TaskName::Roast => self.roast.as_deref(),
            TaskName::Feedback => self.feedback.as_deref(),
        }
    }

    /// Every override must embed the resume
    pub fn validate(&self) -> Result<(), CriticError> {
        for task in TaskName::ALL {
            if let Some(template) = self.get(task) {
                if !template.contains(RESUME_PLACEHOLDER) {
                    return Err(CriticError::config(format!(
                        "prompt template for '{}' is missing the {} placeholder",
                        task, RESUME_PLACEHOLDER
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Built-in template for a task
pub fn default_template(task: TaskName) -> &'static str {
    match task {
        TaskName::Appreciation => APPRECIATION_TEMPLATE,
        TaskName::Roast => ROAST_TEMPLATE,
        TaskName::Feedback => FEEDBACK_TEMPLATE,
    }
}

/// Fill a template's placeholders.
///
/// Only the template text is searched for placeholders, never the inserted
/// focus or resume.
pub fn render(template: &str, excerpt: &str, truncated: bool, focus: Option<&str>) -> String {
    let focus_line = focus
        .map(|f| format!("Focus Area: {}\n", f))
        .unwrap_or_default();
    let resume = if truncated {
        format!("{}{}", excerpt, TRUNCATION_MARKER)
    } else {
        excerpt.to_string()
    };
    template
        .split(RESUME_PLACEHOLDER)
        .map(|segment| segment.replace(FOCUS_PLACEHOLDER, &focus_line))
        .collect::<Vec<_>>()
        .join(&resume)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_embed_resume() {
        for task in TaskName::ALL {
            assert!(default_template(task).contains(RESUME_PLACEHOLDER));
            assert!(default_template(task).contains(FOCUS_PLACEHOLDER));
        }
    }

    #[test]
    fn test_render_with_focus() {
        let prompt = render("A {focus}B {resume}", "text", false, Some("projects"));
        assert_eq!(prompt, "A Focus Area: projects\nB text");
    }

    #[test]
    fn test_render_marks_truncation() {
        let prompt = render("{focus}{resume}", "abc", true, None);
        assert_eq!(prompt, "abc... [truncated]");
    }

    #[test]
    fn test_inserted_text_is_not_substituted() {
        let prompt = render("{focus}[{resume}]", "cv {focus}", false, Some("the {resume}"));
        assert_eq!(prompt, "Focus Area: the {resume}\n[cv {focus}]");
    }

    #[test]
    fn test_override_without_resume_rejected() {
        let overrides = PromptOverrides {
            roast: Some("Roast it, {focus}".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            overrides.validate(),
            Err(CriticError::Config(_))
        ));
    }
}
