// SPDX-License-Identifier: MIT

//! Gemini Model - Google's Gemini API implementation

use super::{retry_after_secs, Content, GenerationConfig, Model, Part};
use crate::adk::error::ModelError;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;

const PROVIDER: &str = "Gemini";

/// Google Gemini model implementation
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model_name: String,
}

impl GeminiModel {
    /// Create a new GeminiModel
    ///
    /// Requires `GOOGLE_API_KEY` environment variable to be set.
    pub fn new(model_name: String) -> Result<Self, ModelError> {
        let api_key = env::var("GOOGLE_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("GOOGLE_API_KEY".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
        })
    }

    fn request_body(
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Value {
        let contents: Vec<Value> = history
            .iter()
            .filter(|c| c.role != "system")
            .map(|c| {
                let parts: Vec<Value> = c.parts.iter().filter_map(part_to_gemini_json).collect();
                // Gemini only knows "user" and "model"
                let role = if c.role == "model" { "model" } else { "user" };
                json!({ "role": role, "parts": parts })
            })
            .collect();

        let mut body = json!({ "contents": contents });

        let system = history
            .iter()
            .filter(|c| c.role == "system")
            .map(Content::text)
            .collect::<Vec<_>>()
            .join("\n");
        if !system.is_empty() {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        if let Some(cfg) = config {
            let mut generation = serde_json::Map::new();
            if let Some(t) = cfg.temperature {
                generation.insert("temperature".to_string(), json!(t));
            }
            if let Some(m) = cfg.max_output_tokens {
                generation.insert("maxOutputTokens".to_string(), json!(m));
            }
            if let Some(p) = cfg.top_p {
                generation.insert("topP".to_string(), json!(p));
            }
            if let Some(k) = cfg.top_k {
                generation.insert("topK".to_string(), json!(k));
            }
            if !generation.is_empty() {
                body["generationConfig"] = Value::Object(generation);
            }
        }

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            let function_declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema()
                    })
                })
                .collect();
            body["tools"] = json!([{ "function_declarations": function_declarations }]);
        }

        body
    }

    fn parse_response(resp_json: &Value) -> Result<Content, ModelError> {
        let candidate = resp_json["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| ModelError::invalid_response("no candidates in Gemini response"))?;

        if let Some(finish_reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
            log::debug!("Gemini finish reason: {}", finish_reason);
            match finish_reason {
                "SAFETY" => {
                    return Err(ModelError::invalid_response(
                        "Gemini blocked response due to safety filters",
                    ))
                }
                "MALFORMED_FUNCTION_CALL" | "UNEXPECTED_TOOL_CALL" => {
                    let msg = candidate
                        .get("finishMessage")
                        .and_then(|m| m.as_str())
                        .unwrap_or(finish_reason);
                    return Err(ModelError::invalid_response(format!(
                        "Gemini rejected tool call: {}",
                        msg
                    )));
                }
                _ => {}
            }
        }

        let parts_json = candidate["content"]["parts"].as_array().ok_or_else(|| {
            log::error!("No parts in Gemini candidate: {}", candidate);
            ModelError::invalid_response("no content parts in Gemini response")
        })?;

        Ok(Content {
            role: "model".to_string(),
            parts: parts_json.iter().flat_map(parse_gemini_part).collect(),
        })
    }
}

#[async_trait]
impl Model for GeminiModel {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, ModelError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model_name, self.api_key
        );

        let body = Self::request_body(history, config, tools);
        log::debug!(
            "Gemini request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&resp);
            let text = resp.text().await?;
            return Err(ModelError::from_status(PROVIDER, status, retry_after, text));
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("Gemini response: {}", resp_json);

        Self::parse_response(&resp_json)
    }
}

/// Serialize a Part to Gemini API JSON format
/// Returns None for parts that shouldn't be sent (e.g., Thinking)
pub fn part_to_gemini_json(part: &Part) -> Option<Value> {
    match part {
        Part::Text(t) => Some(json!({ "text": t })),
        Part::Thinking(_) => None,
        Part::FunctionCall {
            name,
            args,
            thought_signature,
            ..
        } => {
            let mut fc = json!({ "functionCall": { "name": name, "args": args } });
            if let Some(sig) = thought_signature {
                fc["thoughtSignature"] = json!(sig);
            }
            Some(fc)
        }
        Part::FunctionResponse { name, response, .. } => {
            Some(json!({ "functionResponse": { "name": name, "response": response } }))
        }
    }
}

/// Parse a Gemini API JSON part into Parts
pub fn parse_gemini_part(p: &Value) -> Vec<Part> {
    let mut parts = Vec::new();

    if let Some(thought) = p.get("thought").and_then(|t| t.as_str()) {
        if !thought.is_empty() {
            parts.push(Part::Thinking(thought.to_string()));
        }
    }

    if let Some(text) = p["text"].as_str() {
        parts.push(Part::Text(text.to_string()));
    } else if let Some(fc) = p.get("functionCall") {
        parts.push(Part::FunctionCall {
            id: None,
            name: fc["name"].as_str().unwrap_or_default().to_string(),
            args: fc["args"].clone(),
            thought_signature: p
                .get("thoughtSignature")
                .and_then(|s| s.as_str())
                .map(|s| s.to_string()),
        });
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_call_keeps_thought_signature() {
        let part = Part::FunctionCall {
            id: Some("call-1".to_string()),
            name: "resume_roast".to_string(),
            args: json!({"focus": "projects"}),
            thought_signature: Some("sig123abc".to_string()),
        };
        let json = part_to_gemini_json(&part).unwrap();

        assert_eq!(json["functionCall"]["name"], "resume_roast");
        assert_eq!(json["functionCall"]["args"]["focus"], "projects");
        assert_eq!(json["thoughtSignature"], "sig123abc");
    }

    #[test]
    fn test_thinking_part_is_not_sent() {
        assert!(part_to_gemini_json(&Part::Thinking("internal".to_string())).is_none());
    }

    #[test]
    fn test_parse_function_call() {
        let parts = parse_gemini_part(&json!({
            "functionCall": { "name": "resume_feedback", "args": {} }
        }));

        assert_eq!(parts.len(), 1);
        match &parts[0] {
            Part::FunctionCall { name, id, .. } => {
                assert_eq!(name, "resume_feedback");
                assert!(id.is_none());
            }
            _ => panic!("Expected FunctionCall part"),
        }
    }

    #[test]
    fn test_parse_empty_thought_ignored() {
        let parts = parse_gemini_part(&json!({ "thought": "", "text": "Hello" }));
        assert_eq!(parts.len(), 1);
        assert!(matches!(&parts[0], Part::Text(t) if t == "Hello"));
    }

    #[test]
    fn test_request_body_maps_generation_config() {
        let config = GenerationConfig {
            temperature: Some(0.5),
            max_output_tokens: Some(256),
            ..Default::default()
        };
        let body = GeminiModel::request_body(&[Content::user_text("hi")], Some(&config), None);

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_system_content_becomes_system_instruction() {
        let history = vec![
            Content {
                role: "system".to_string(),
                parts: vec![Part::Text("Pick review tools".to_string())],
            },
            Content::user_text("roast please"),
        ];
        let body = GeminiModel::request_body(&history, None, None);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Pick review tools");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "roast please");
    }

    #[test]
    fn test_parse_response_text() {
        let content = GeminiModel::parse_response(&json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "**Roast**" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(content.text(), "**Roast**");
    }

    #[test]
    fn test_parse_response_safety_block() {
        let err = GeminiModel::parse_response(&json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_response_without_candidates() {
        assert!(GeminiModel::parse_response(&json!({})).is_err());
    }
}
