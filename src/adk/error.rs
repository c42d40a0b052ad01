// SPDX-License-Identifier: MIT

//! Typed error handling for resume-critic
//!
//! Only [`CriticError::InvalidInput`] is fatal to a review run. Model failures
//! are recovered per task and surface in the report instead.

use thiserror::Error;

/// Top-level error type for resume-critic
#[derive(Debug, Error)]
pub enum CriticError {
    /// The document (or another caller input) failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Errors raised by the language model service
    #[error("LLM service error: {0}")]
    Model(#[from] ModelError),

    /// Configuration errors (bad config file, unknown provider, bad template)
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Provider name not recognised
    #[error("Unsupported model provider: {0}")]
    UnsupportedProvider(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-success response from the provider
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Response could not be interpreted
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// Transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl CriticError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl ModelError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Map a non-success HTTP status and body to an error
    pub(crate) fn from_status(
        provider: &str,
        status: reqwest::StatusCode,
        retry_after_secs: Option<u64>,
        body: String,
    ) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited { retry_after_secs }
        } else {
            Self::api(provider, format!("{}: {}", status, body))
        }
    }
}
