// SPDX-License-Identifier: MIT

//! Resume review orchestration
//!
//! An instruction is routed to an ordered list of review tasks
//! ([intent]), which the [graph] executes through a bounded Decide/Act cycle
//! using the [executor], before the [report] joins the outputs.

pub mod config;
pub mod conversation;
pub mod document;
pub mod executor;
pub mod graph;
pub mod intent;
pub mod pipeline;
pub mod prompts;
pub mod registry;
pub mod report;
pub mod task;

pub use config::{ConfigLoader, CriticConfig, Strategy};
pub use document::{Document, DocumentLimits};
pub use graph::{ExecutionMode, OrchestrationGraph, StopReason};
pub use pipeline::{Review, ReviewPipeline};
pub use task::{TaskName, TaskOutcome, TaskRequest, TaskResult};
