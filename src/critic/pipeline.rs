// SPDX-License-Identifier: MIT

//! Review pipeline - validation, orchestration and aggregation in one call

use crate::adk::error::CriticError;
use crate::adk::model::Model;
use crate::critic::config::{CriticConfig, Strategy};
use crate::critic::document::Document;
use crate::critic::executor::TaskExecutor;
use crate::critic::graph::{
    Decider, KeywordDecider, OrchestrationGraph, StopReason, ToolCallDecider,
};
use crate::critic::registry::TaskRegistry;
use crate::critic::report;
use crate::critic::task::TaskResult;
use std::sync::Arc;

/// Outcome of one review
#[derive(Debug, Clone)]
pub struct Review {
    pub report: String,
    pub results: Vec<TaskResult>,
    pub cycles: u32,
    pub stop: StopReason,
}

impl Review {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// Entry point for reviewing a document
pub struct ReviewPipeline {
    registry: Arc<TaskRegistry>,
    graph: OrchestrationGraph,
}

impl ReviewPipeline {
    /// Wire registry, decider and graph from config around a model
    pub fn from_config(config: &CriticConfig, model: Arc<dyn Model>) -> Result<Self, CriticError> {
        config.validate()?;
        let registry = Arc::new(TaskRegistry::new(&config.prompts, config.document)?);

        let mut executor = TaskExecutor::new(registry.clone(), model.clone());
        if let Some(generation) = &config.generation {
            executor = executor.with_generation_config(generation.clone());
        }

        let decider: Arc<dyn Decider> = match config.strategy {
            Strategy::Keywords => Arc::new(KeywordDecider),
            Strategy::ToolCalls => {
                let mut decider = ToolCallDecider::new(model, registry.tools());
                if let Some(generation) = &config.generation {
                    decider = decider.with_generation_config(generation.clone());
                }
                Arc::new(decider)
            }
        };

        let graph = OrchestrationGraph::new(executor, decider)
            .with_cycle_budget(config.cycle_budget)
            .with_execution_mode(config.execution);

        Ok(Self { registry, graph })
    }

    /// Review a document as the instruction asks.
    ///
    /// The document is validated before anything reaches the model; an invalid
    /// document is the only way this returns `Err`.
    pub async fn review(&self, instruction: &str, document: Document) -> Result<Review, CriticError> {
        self.registry.limits().validate(&document)?;

        let run = self.graph.run(instruction, Arc::new(document)).await?;

        Ok(Review {
            report: report::aggregate(&run.results),
            results: run.results,
            cycles: run.cycles,
            stop: run.stop,
        })
    }
}
