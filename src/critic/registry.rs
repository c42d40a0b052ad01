// SPDX-License-Identifier: MIT

//! Registry of the fixed review tasks
//!
//! Built once per run and shared by `Arc`; nothing is registered after
//! construction.

use crate::adk::error::CriticError;
use crate::adk::tool::Tool;
use crate::critic::document::{Document, DocumentLimits};
use crate::critic::prompts::{self, PromptOverrides};
use crate::critic::task::TaskName;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Arguments the model may pass when calling a task tool.
///
/// The resume itself is attached by the caller, so it is not part of the schema.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ReviewToolArgs {
    /// Specific area of the resume to focus on
    #[serde(default)]
    pub focus: String,
}

static REVIEW_TOOL_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let mut schema = serde_json::to_value(schemars::schema_for!(ReviewToolArgs))
        .unwrap_or_else(|_| json!({ "type": "object", "properties": {} }));
    // Function declarations reject the JSON Schema meta keys
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        if let Some(Value::Object(props)) = obj.get_mut("properties") {
            for prop in props.values_mut().filter_map(Value::as_object_mut) {
                prop.remove("default");
            }
        }
    }
    schema
});

/// A task bound to its prompt template, exposed to the model as a tool
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    task: TaskName,
    description: String,
    template: String,
}

impl TaskDefinition {
    fn new(task: TaskName, template: &str) -> Self {
        let description = match task {
            TaskName::Appreciation => {
                "Appreciate the key strengths and positive aspects of the resume in Hinglish"
            }
            TaskName::Roast => "Roast the resume with constructive criticism in Hinglish",
            TaskName::Feedback => {
                "Provide actionable suggestions for improving the resume in Hinglish"
            }
        };
        Self {
            task,
            description: description.to_string(),
            template: template.to_string(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Tool for TaskDefinition {
    fn name(&self) -> &str {
        self.task.tool_name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> &Value {
        &REVIEW_TOOL_SCHEMA
    }
}

/// The fixed set of review tasks and how to prompt for each
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    /// Indexed by [`TaskName::index`]
    definitions: [Arc<TaskDefinition>; 3],
    limits: DocumentLimits,
}

impl TaskRegistry {
    /// Build the registry, applying any template overrides
    pub fn new(overrides: &PromptOverrides, limits: DocumentLimits) -> Result<Self, CriticError> {
        overrides.validate()?;
        Ok(Self::build(overrides, limits))
    }

    fn build(overrides: &PromptOverrides, limits: DocumentLimits) -> Self {
        let definitions = TaskName::ALL.map(|task| {
            let template = overrides
                .get(task)
                .unwrap_or_else(|| prompts::default_template(task));
            Arc::new(TaskDefinition::new(task, template))
        });
        Self {
            definitions,
            limits,
        }
    }

    pub fn limits(&self) -> DocumentLimits {
        self.limits
    }

    pub fn definition(&self, task: TaskName) -> &TaskDefinition {
        &self.definitions[task.index()]
    }

    /// Task declarations to hand to a tool-calling model
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.definitions
            .iter()
            .map(|d| d.clone() as Arc<dyn Tool>)
            .collect()
    }

    /// Build the prompt for one task.
    ///
    /// Fails with [`CriticError::InvalidInput`] before anything is sent when the
    /// document is below the minimum length. Content beyond the prompt limit is
    /// cut and marked.
    pub fn build_prompt(
        &self,
        task: TaskName,
        document: &Document,
        focus: Option<&str>,
    ) -> Result<String, CriticError> {
        self.limits.validate(document)?;
        let (excerpt, truncated) = self.limits.excerpt(document);
        if truncated {
            log::debug!(
                "Truncated resume from {} to {} characters for {}",
                document.char_len(),
                self.limits.max_prompt_chars,
                task
            );
        }
        Ok(prompts::render(
            self.definition(task).template(),
            excerpt,
            truncated,
            focus,
        ))
    }
}

impl Default for TaskRegistry {
    /// Built-in templates need no validation
    fn default() -> Self {
        Self::build(&PromptOverrides::default(), DocumentLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critic::prompts::TRUNCATION_MARKER;

    fn resume(len: usize) -> Document {
        Document::new("r".repeat(len), None)
    }

    #[test]
    fn test_prompt_contains_task_heading_and_resume() {
        let registry = TaskRegistry::default();
        let doc = Document::new(format!("Rust engineer. {}", "x".repeat(120)), None);

        let prompt = registry
            .build_prompt(TaskName::Roast, &doc, Some("projects"))
            .unwrap();

        assert!(prompt.starts_with("**Roast Section**"));
        assert!(prompt.contains("Focus Area: projects\nRust engineer."));
        assert!(!prompt.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn test_prompt_rejects_short_document() {
        let registry = TaskRegistry::default();
        let err = registry
            .build_prompt(TaskName::Feedback, &resume(50), None)
            .unwrap_err();
        assert!(matches!(err, CriticError::InvalidInput(_)));
    }

    #[test]
    fn test_long_document_is_truncated() {
        let registry = TaskRegistry::default();
        let prompt = registry
            .build_prompt(TaskName::Appreciation, &resume(5000), None)
            .unwrap();

        assert!(prompt.contains(&format!("{}{}", "r".repeat(2000), TRUNCATION_MARKER)));
        assert!(!prompt.contains(&"r".repeat(2001)));
    }

    #[test]
    fn test_overrides_replace_template() {
        let overrides = PromptOverrides {
            feedback: Some("Short feedback please: {resume}".to_string()),
            ..Default::default()
        };
        let registry = TaskRegistry::new(&overrides, DocumentLimits::default()).unwrap();

        let prompt = registry
            .build_prompt(TaskName::Feedback, &resume(100), None)
            .unwrap();
        assert!(prompt.starts_with("Short feedback please: rrr"));

        let roast = registry
            .build_prompt(TaskName::Roast, &resume(100), None)
            .unwrap();
        assert!(roast.starts_with("**Roast Section**"));
    }

    #[test]
    fn test_tools_expose_every_task() {
        let registry = TaskRegistry::default();
        let names: Vec<String> = registry
            .tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["resume_roast", "resume_appreciation", "resume_feedback"]
        );
    }

    #[test]
    fn test_definition_lookup_matches_task() {
        let registry = TaskRegistry::default();
        for task in TaskName::ALL {
            let definition = registry.definition(task);
            assert_eq!(definition.name(), task.tool_name());
            assert_eq!(definition.template(), prompts::default_template(task));
        }
    }

    #[test]
    fn test_tool_schema_is_plain_object() {
        let registry = TaskRegistry::default();
        let tools = registry.tools();
        let schema = tools[0].schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["focus"]["type"], "string");
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());
        assert!(schema["properties"]["focus"].get("default").is_none());
    }
}
