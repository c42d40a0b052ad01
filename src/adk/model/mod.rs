// SPDX-License-Identifier: MIT

//! Model module - defines LLM model trait and implementations
//!
//! This module provides the core Model trait and shared types.
//! Model implementations are in their own submodules:
//! - [gemini] - Google's Gemini API (default)
//! - [openai] - OpenAI's ChatGPT API

pub mod gemini;
pub mod openai;

use crate::adk::error::ModelError;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part user message
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text parts, ignoring thinking and function parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Parts of a message - text, thinking, function calls, etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Thinking/reasoning content from thinking models
    Thinking(String),
    /// Function/tool call requested by the model
    FunctionCall {
        /// Provider call id, when the provider issues one
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        args: serde_json::Value,
        /// Thought signature from Gemini thinking models - must be preserved and sent back
        #[serde(skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },
    /// Response from executing a function/tool
    FunctionResponse {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        response: serde_json::Value,
    },
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, ModelError>;

    /// Send a single prompt and return the completion text.
    ///
    /// A response without any text is an [`ModelError::InvalidResponse`].
    async fn invoke(
        &self,
        prompt: &str,
        config: Option<&GenerationConfig>,
    ) -> Result<String, ModelError> {
        let response = self
            .generate_content(&[Content::user_text(prompt)], config, None)
            .await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(ModelError::invalid_response("empty completion"));
        }
        Ok(text)
    }
}

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAI,
}

impl Provider {
    /// Infer the provider from a model name, falling back to Gemini
    pub fn infer(model_name: &str) -> Self {
        if model_name.starts_with("gpt") || model_name.starts_with("o1") {
            Self::OpenAI
        } else {
            Self::Gemini
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            other => Err(ModelError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Build a model for the given provider, reading credentials from the environment
pub fn create_model(provider: Provider, model_name: &str) -> Result<Arc<dyn Model>, ModelError> {
    log::info!("Using provider: {:?} with model: {}", provider, model_name);
    let model: Arc<dyn Model> = match provider {
        Provider::Gemini => Arc::new(gemini::GeminiModel::new(model_name.to_string())?),
        Provider::OpenAI => Arc::new(openai::OpenAIModel::new(model_name.to_string())?),
    };
    Ok(model)
}

/// Read a `Retry-After` header expressed in seconds
pub(crate) fn retry_after_secs(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
