// SPDX-License-Identifier: MIT

//! OpenAI Model - ChatGPT API implementation

use super::{retry_after_secs, Content, GenerationConfig, Model, Part};
use crate::adk::error::ModelError;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;

const PROVIDER: &str = "OpenAI";

/// OpenAI ChatGPT model implementation
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl OpenAIModel {
    /// Create a new OpenAIModel
    ///
    /// Requires `OPENAI_API_KEY` environment variable to be set.
    /// Optionally uses `OPENAI_BASE_URL` for custom endpoints.
    pub fn new(model_name: String) -> Result<Self, ModelError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("OPENAI_API_KEY".to_string()))?;
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            base_url,
        })
    }

    /// Convert internal Content to OpenAI messages.
    ///
    /// A content holding several function responses expands to one `tool`
    /// message per response, as the chat API requires.
    fn content_to_openai_messages(content: &Content) -> Vec<Value> {
        let responses: Vec<Value> = content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionResponse { id, name, response } => Some(json!({
                    "role": "tool",
                    "tool_call_id": id.as_deref().unwrap_or(name.as_str()),
                    "content": serde_json::to_string(response).unwrap_or_default()
                })),
                _ => None,
            })
            .collect();
        if !responses.is_empty() {
            return responses;
        }

        let role = match content.role.as_str() {
            "model" => "assistant",
            other => other,
        };

        let mut tool_calls = Vec::new();
        let mut text_content = String::new();
        for part in &content.parts {
            match part {
                Part::Text(t) => text_content.push_str(t),
                Part::FunctionCall { id, name, args, .. } => tool_calls.push(json!({
                    "id": id.as_deref().unwrap_or(name.as_str()),
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": serde_json::to_string(args).unwrap_or_default()
                    }
                })),
                Part::Thinking(_) | Part::FunctionResponse { .. } => {}
            }
        }

        if tool_calls.is_empty() {
            vec![json!({ "role": role, "content": text_content })]
        } else {
            let text = if text_content.is_empty() {
                Value::Null
            } else {
                json!(text_content)
            };
            vec![json!({ "role": role, "content": text, "tool_calls": tool_calls })]
        }
    }

    fn tools_to_openai_format(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema()
                    }
                })
            })
            .collect()
    }

    fn parse_openai_response(response: &Value) -> Result<Content, ModelError> {
        let message = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .map(|choice| &choice["message"])
            .ok_or_else(|| ModelError::invalid_response("no choices in OpenAI response"))?;

        let mut parts = Vec::new();

        if let Some(content) = message["content"].as_str() {
            if !content.is_empty() {
                parts.push(Part::Text(content.to_string()));
            }
        }

        if let Some(tool_calls) = message["tool_calls"].as_array() {
            for tc in tool_calls {
                let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");
                parts.push(Part::FunctionCall {
                    id: tc["id"].as_str().map(|s| s.to_string()),
                    name: tc["function"]["name"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                    args: serde_json::from_str(args_str).unwrap_or_else(|_| json!({})),
                    thought_signature: None,
                });
            }
        }

        Ok(Content {
            role: "model".to_string(),
            parts,
        })
    }
}

#[async_trait]
impl Model for OpenAIModel {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);

        let messages: Vec<Value> = history
            .iter()
            .flat_map(Self::content_to_openai_messages)
            .collect();

        let mut body = json!({
            "model": self.model_name,
            "messages": messages
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["temperature"] = json!(temp);
            }
            if let Some(max_tokens) = cfg.max_output_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(top_p) = cfg.top_p {
                body["top_p"] = json!(top_p);
            }
        }

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            body["tools"] = json!(Self::tools_to_openai_format(tools));
            body["tool_choice"] = json!("auto");
        }

        log::debug!(
            "OpenAI request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&resp);
            let text = resp.text().await?;
            return Err(ModelError::from_status(PROVIDER, status, retry_after, text));
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("OpenAI response: {}", resp_json);

        Self::parse_openai_response(&resp_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_role_maps_to_assistant() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![Part::Text("I can help".to_string())],
        };

        let msgs = OpenAIModel::content_to_openai_messages(&content);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0]["role"], "assistant");
        assert_eq!(msgs[0]["content"], "I can help");
    }

    #[test]
    fn test_function_call_uses_call_id() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![Part::FunctionCall {
                id: Some("call_1".to_string()),
                name: "resume_roast".to_string(),
                args: json!({}),
                thought_signature: None,
            }],
        };

        let msgs = OpenAIModel::content_to_openai_messages(&content);
        assert_eq!(msgs[0]["content"], Value::Null);
        assert_eq!(msgs[0]["tool_calls"][0]["id"], "call_1");
        assert_eq!(msgs[0]["tool_calls"][0]["function"]["name"], "resume_roast");
    }

    #[test]
    fn test_function_responses_expand_to_tool_messages() {
        let content = Content {
            role: "user".to_string(),
            parts: vec![
                Part::FunctionResponse {
                    id: Some("call_1".to_string()),
                    name: "resume_roast".to_string(),
                    response: json!({"result": "roasted"}),
                },
                Part::FunctionResponse {
                    id: None,
                    name: "resume_feedback".to_string(),
                    response: json!({"result": "fix it"}),
                },
            ],
        };

        let msgs = OpenAIModel::content_to_openai_messages(&content);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["role"], "tool");
        assert_eq!(msgs[0]["tool_call_id"], "call_1");
        assert_eq!(msgs[1]["tool_call_id"], "resume_feedback");
    }

    #[test]
    fn test_parse_openai_function_call_response() {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "resume_appreciation",
                            "arguments": "{\"focus\": \"experience\"}"
                        }
                    }]
                }
            }]
        });

        let content = OpenAIModel::parse_openai_response(&response).unwrap();
        assert_eq!(content.parts.len(), 1);

        match &content.parts[0] {
            Part::FunctionCall { id, name, args, .. } => {
                assert_eq!(id.as_deref(), Some("call_123"));
                assert_eq!(name, "resume_appreciation");
                assert_eq!(args["focus"], "experience");
            }
            _ => panic!("Expected FunctionCall part"),
        }
    }

    #[test]
    fn test_parse_openai_without_choices() {
        assert!(OpenAIModel::parse_openai_response(&json!({ "choices": [] })).is_err());
    }
}
