// SPDX-License-Identifier: MIT

//! Task names, requests and results

use crate::critic::document::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// One of the three fixed review passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskName {
    Roast,
    Appreciation,
    Feedback,
}

impl TaskName {
    /// Every task, in keyword scan order
    pub const ALL: [TaskName; 3] = [TaskName::Roast, TaskName::Appreciation, TaskName::Feedback];

    /// Position of this task in [`TaskName::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Word that requests this task in a free-form instruction
    pub fn keyword(self) -> &'static str {
        match self {
            TaskName::Appreciation => "appreciation",
            TaskName::Roast => "roast",
            TaskName::Feedback => "feedback",
        }
    }

    /// Name of the tool the model calls to request this task
    pub fn tool_name(self) -> &'static str {
        match self {
            TaskName::Appreciation => "resume_appreciation",
            TaskName::Roast => "resume_roast",
            TaskName::Feedback => "resume_feedback",
        }
    }

    /// Resolve a tool name back to its task
    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tool_name() == name)
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for TaskName {
    type Err = String;

    /// Accepts either the keyword or the tool name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.keyword() == lower || t.tool_name() == lower)
            .ok_or_else(|| format!("unknown task: {}", s))
    }
}

/// A pending task, consumed exactly once by the executor
#[derive(Debug, Clone)]
pub struct TaskRequest {
    /// Pairs the request with its result in the conversation
    pub call_id: String,
    pub task: TaskName,
    pub document: Arc<Document>,
    pub focus: Option<String>,
}

impl TaskRequest {
    /// Create a request with a fresh call id, focusing where the document does
    pub fn new(task: TaskName, document: Arc<Document>) -> Self {
        let focus = document.focus().map(|f| f.to_string());
        Self::with_focus(task, document, focus)
    }

    pub fn with_focus(task: TaskName, document: Arc<Document>, focus: Option<String>) -> Self {
        Self {
            call_id: uuid::Uuid::new_v4().to_string(),
            task,
            document,
            focus: focus.filter(|f| !f.trim().is_empty()),
        }
    }
}

/// Outcome of a single task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Completion text, verbatim
    Completed(String),
    /// Failure detail from the LLM service
    Failed(String),
}

/// Immutable result of executing one [`TaskRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub call_id: String,
    pub task: TaskName,
    pub outcome: TaskOutcome,
}

impl TaskResult {
    pub fn completed(call_id: impl Into<String>, task: TaskName, text: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            task,
            outcome: TaskOutcome::Completed(text.into()),
        }
    }

    pub fn failed(call_id: impl Into<String>, task: TaskName, reason: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            task,
            outcome: TaskOutcome::Failed(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Completed(_))
    }

    /// Payload as sent back to the model in a function response
    pub fn to_json(&self) -> serde_json::Value {
        match &self.outcome {
            TaskOutcome::Completed(text) => serde_json::json!({ "result": text }),
            TaskOutcome::Failed(reason) => serde_json::json!({ "error": reason }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_round_trip() {
        for task in TaskName::ALL {
            assert_eq!(TaskName::from_tool_name(task.tool_name()), Some(task));
        }
        assert_eq!(TaskName::from_tool_name("resume_summary"), None);
    }

    #[test]
    fn test_index_matches_scan_order() {
        for (i, task) in TaskName::ALL.into_iter().enumerate() {
            assert_eq!(task.index(), i);
        }
    }

    #[test]
    fn test_parse_task_name() {
        assert_eq!("Roast".parse::<TaskName>().unwrap(), TaskName::Roast);
        assert_eq!(
            "resume_feedback".parse::<TaskName>().unwrap(),
            TaskName::Feedback
        );
        assert!("praise".parse::<TaskName>().is_err());
    }

    #[test]
    fn test_display_uses_keyword() {
        assert_eq!(TaskName::Appreciation.to_string(), "appreciation");
    }

    #[test]
    fn test_result_json_payload() {
        let ok = TaskResult::completed("1", TaskName::Roast, "burn");
        let err = TaskResult::failed("2", TaskName::Roast, "timeout");

        assert!(ok.is_success());
        assert!(!err.is_success());
        assert_eq!(ok.to_json()["result"], "burn");
        assert_eq!(err.to_json()["error"], "timeout");
    }
}
