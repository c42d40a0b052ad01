// SPDX-License-Identifier: MIT

//! Append-only message log for one orchestration run

use crate::adk::model::{Content, Part};
use crate::critic::task::{TaskName, TaskRequest, TaskResult};
use serde_json::json;
use std::collections::HashSet;

/// Requests proposed by one decide step.
///
/// When the requests came from a model response, the response is kept as-is so
/// later turns can replay it (thought signatures included).
#[derive(Debug, Clone, Default)]
pub struct Decision {
    pub requests: Vec<TaskRequest>,
    pub response: Option<Content>,
}

impl Decision {
    pub fn from_requests(requests: Vec<TaskRequest>) -> Self {
        Self {
            requests,
            response: None,
        }
    }

    pub fn with_response(mut self, response: Content) -> Self {
        self.response = Some(response);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Rebuild the model turn that proposed these requests
    fn model_turn(&self) -> Content {
        if let Some(response) = &self.response {
            return response.clone();
        }
        Content {
            role: "model".to_string(),
            parts: self
                .requests
                .iter()
                .map(|r| Part::FunctionCall {
                    id: Some(r.call_id.clone()),
                    name: r.task.tool_name().to_string(),
                    args: match &r.focus {
                        Some(focus) => json!({ "focus": focus }),
                        None => json!({}),
                    },
                    thought_signature: None,
                })
                .collect(),
        }
    }

    /// Responses for calls in the model turn that were not kept as requests
    /// (repeats and unknown tools), so every call gets an answer.
    fn skipped_responses(&self) -> Vec<Part> {
        let Some(response) = &self.response else {
            return Vec::new();
        };
        let mut claimed = vec![false; self.requests.len()];
        response
            .parts
            .iter()
            .filter_map(|part| {
                let Part::FunctionCall { id, name, .. } = part else {
                    return None;
                };
                let slot = (0..self.requests.len()).find(|&i| {
                    !claimed[i]
                        && match id {
                            Some(id) => self.requests[i].call_id == *id,
                            None => self.requests[i].task.tool_name() == name,
                        }
                });
                match slot {
                    Some(i) => {
                        claimed[i] = true;
                        None
                    }
                    None => Some(Part::FunctionResponse {
                        id: id.clone(),
                        name: name.clone(),
                        response: json!({ "error": "skipped: task not run again in this review" }),
                    }),
                }
            })
            .collect()
    }
}

/// One entry in the conversation
#[derive(Debug, Clone)]
pub enum Message {
    /// The user's instruction
    User(String),
    /// A decide step's batch of pending requests
    Decision(Decision),
    /// The result of executing one request
    ToolResult(TaskResult),
}

/// Ordered message log owned by the orchestration graph.
///
/// Deciders only ever see it through `&ConversationState`.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::User(instruction.into())],
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The first user instruction of the run
    pub fn first_instruction(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match m {
            Message::User(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Whether any decide step has produced requests yet
    pub fn has_decision(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m, Message::Decision(_)))
    }

    /// Requests of the latest decision, if it is the last entry
    pub fn pending(&self) -> &[TaskRequest] {
        match self.messages.last() {
            Some(Message::Decision(decision)) => &decision.requests,
            _ => &[],
        }
    }

    /// Tasks that already have a result in this run
    pub fn satisfied(&self) -> HashSet<TaskName> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::ToolResult(r) => Some(r.task),
                _ => None,
            })
            .collect()
    }

    /// Results in execution order
    pub fn results(&self) -> Vec<TaskResult> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::ToolResult(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Render the log as model history.
    ///
    /// A model response is replayed unchanged; decisions without one become
    /// synthesized function calls. Consecutive function responses are grouped
    /// into a single user turn.
    pub fn to_history(&self) -> Vec<Content> {
        let mut history: Vec<Content> = Vec::with_capacity(self.messages.len());
        for message in &self.messages {
            match message {
                Message::User(text) => history.push(Content::user_text(text.clone())),
                Message::Decision(decision) => {
                    history.push(decision.model_turn());
                    for part in decision.skipped_responses() {
                        push_function_response(&mut history, part);
                    }
                }
                Message::ToolResult(result) => push_function_response(
                    &mut history,
                    Part::FunctionResponse {
                        id: Some(result.call_id.clone()),
                        name: result.task.tool_name().to_string(),
                        response: result.to_json(),
                    },
                ),
            }
        }
        history
    }
}

fn push_function_response(history: &mut Vec<Content>, part: Part) {
    let extends_last = history.last().is_some_and(|last| {
        last.role == "user"
            && last
                .parts
                .iter()
                .all(|p| matches!(p, Part::FunctionResponse { .. }))
    });
    match history.last_mut() {
        Some(last) if extends_last => last.parts.push(part),
        _ => history.push(Content {
            role: "user".to_string(),
            parts: vec![part],
        }),
    }
}
