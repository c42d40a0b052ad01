// SPDX-License-Identifier: MIT

//! Review configuration - YAML file loading and defaults

use crate::adk::error::CriticError;
use crate::adk::model::{GenerationConfig, Provider};
use crate::critic::document::DocumentLimits;
use crate::critic::graph::{ExecutionMode, DEFAULT_CYCLE_BUDGET};
use crate::critic::prompts::PromptOverrides;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// How the decide step picks tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Keyword routing on the instruction
    #[default]
    Keywords,
    /// Let the model choose through tool calls
    ToolCalls,
}

impl FromStr for Strategy {
    type Err = CriticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "keywords" => Ok(Self::Keywords),
            "tool_calls" => Ok(Self::ToolCalls),
            other => Err(CriticError::config(format!("unknown strategy: {}", other))),
        }
    }
}

/// Everything a review run can be configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticConfig {
    /// Inferred from the model name when absent
    pub provider: Option<Provider>,
    pub model: String,
    pub cycle_budget: u32,
    pub strategy: Strategy,
    pub execution: ExecutionMode,
    pub document: DocumentLimits,
    pub generation: Option<GenerationConfig>,
    pub prompts: PromptOverrides,
}

impl Default for CriticConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: DEFAULT_MODEL.to_string(),
            cycle_budget: DEFAULT_CYCLE_BUDGET,
            strategy: Strategy::default(),
            execution: ExecutionMode::default(),
            document: DocumentLimits::default(),
            generation: None,
            prompts: PromptOverrides::default(),
        }
    }
}

impl CriticConfig {
    /// The configured provider, or the one the model name implies
    pub fn resolved_provider(&self) -> Provider {
        self.provider
            .unwrap_or_else(|| Provider::infer(&self.model))
    }

    pub fn validate(&self) -> Result<(), CriticError> {
        if self.model.trim().is_empty() {
            return Err(CriticError::config("model name must not be empty"));
        }
        if self.cycle_budget == 0 {
            return Err(CriticError::config("cycle_budget must be at least 1"));
        }
        if self.document.max_prompt_chars == 0 {
            return Err(CriticError::config(
                "document.max_prompt_chars must be at least 1",
            ));
        }
        self.prompts.validate()
    }
}

/// Loads review configuration from YAML files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<CriticConfig, CriticError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CriticError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse_yaml(&content)
    }

    /// Parse and validate a config from a YAML string
    pub fn parse_yaml(content: &str) -> Result<CriticConfig, CriticError> {
        let config: CriticConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
