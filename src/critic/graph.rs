// SPDX-License-Identifier: MIT

//! Orchestration graph - a bounded Decide/Act state machine
//!
//! ```text
//!            requests            results appended
//!  Decide ─────────────▶ Act ─────────────────────┐
//!    ▲ │                                          │
//!    │ └──▶ Done  (no new requests, or budget 0)  │
//!    └────────────────────────────────────────────┘
//! ```
//!
//! Each task runs at most once per run: requests for tasks that already have a
//! result, and repeats within one batch, are dropped before the Act step.

use crate::adk::error::CriticError;
use crate::adk::model::{Content, GenerationConfig, Model, Part};
use crate::adk::tool::Tool;
use crate::critic::conversation::{ConversationState, Decision, Message};
use crate::critic::document::Document;
use crate::critic::executor::TaskExecutor;
use crate::critic::intent;
use crate::critic::registry::ReviewToolArgs;
use crate::critic::task::{TaskName, TaskRequest, TaskResult};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of Decide->Act cycles per run
pub const DEFAULT_CYCLE_BUDGET: u32 = 3;

const TOOL_CALL_INSTRUCTION: &str = "You review resumes. Call the review tools the user asks \
for, in the order they ask for them, once each. When every requested review has a result, \
reply with a short text summary and no tool calls.";

/// State of the orchestration machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Decide,
    Act,
    Done,
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A decide step proposed nothing new
    NoPendingRequests,
    /// The cycle budget ran out; results so far are kept
    BudgetExhausted,
}

/// How the requests of one decide step are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One after another, in request order
    #[default]
    Sequential,
    /// All at once; results are still reported in request order
    Concurrent,
}

/// Upper bound on Decide->Act alternations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBudget {
    limit: u32,
    used: u32,
}

impl CycleBudget {
    pub fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    fn consume(&mut self) {
        self.used += 1;
    }
}

impl Default for CycleBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_BUDGET)
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct GraphRun {
    /// Results in execution order
    pub results: Vec<TaskResult>,
    /// Act steps taken
    pub cycles: u32,
    pub stop: StopReason,
}

/// Proposes the next batch of task requests
#[async_trait]
pub trait Decider: Send + Sync {
    async fn decide(
        &self,
        conversation: &ConversationState,
        document: &Arc<Document>,
    ) -> Decision;
}

/// Keyword routing: the whole task list is computed once, from the first
/// user instruction, and nothing is proposed after that.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordDecider;

impl KeywordDecider {
    fn requests_for(instruction: &str, document: &Arc<Document>) -> Vec<TaskRequest> {
        intent::detect(instruction)
            .into_iter()
            .map(|task| TaskRequest::new(task, document.clone()))
            .collect()
    }
}

#[async_trait]
impl Decider for KeywordDecider {
    async fn decide(
        &self,
        conversation: &ConversationState,
        document: &Arc<Document>,
    ) -> Decision {
        if conversation.has_decision() {
            return Decision::default();
        }
        let instruction = conversation.first_instruction().unwrap_or_default();
        Decision::from_requests(Self::requests_for(instruction, document))
    }
}

/// Model-driven routing: the model picks tasks through tool calls.
///
/// If the model fails before anything was decided, routing falls back to
/// keywords; a failure later ends the run.
pub struct ToolCallDecider {
    model: Arc<dyn Model>,
    tools: Vec<Arc<dyn Tool>>,
    generation: Option<GenerationConfig>,
}

impl ToolCallDecider {
    pub fn new(model: Arc<dyn Model>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            model,
            tools,
            generation: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation = Some(config);
        self
    }

    fn requests_from(response: &Content, document: &Arc<Document>) -> Vec<TaskRequest> {
        response
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall { id, name, args, .. } => {
                    let Some(task) = TaskName::from_tool_name(name) else {
                        log::warn!("Model called unknown tool '{}', skipping", name);
                        return None;
                    };
                    let args: ReviewToolArgs =
                        serde_json::from_value(args.clone()).unwrap_or_default();
                    let focus = Some(args.focus)
                        .filter(|f| !f.trim().is_empty())
                        .or_else(|| document.focus().map(|f| f.to_string()));
                    let mut request = TaskRequest::with_focus(task, document.clone(), focus);
                    if let Some(id) = id {
                        request.call_id = id.clone();
                    }
                    Some(request)
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Decider for ToolCallDecider {
    async fn decide(
        &self,
        conversation: &ConversationState,
        document: &Arc<Document>,
    ) -> Decision {
        let mut history = vec![Content {
            role: "system".to_string(),
            parts: vec![Part::Text(TOOL_CALL_INSTRUCTION.to_string())],
        }];
        history.extend(conversation.to_history());

        match self
            .model
            .generate_content(&history, self.generation.as_ref(), Some(self.tools.as_slice()))
            .await
        {
            Ok(response) => {
                let requests = Self::requests_from(&response, document);
                if requests.is_empty() {
                    log::info!("Model requested no further tools");
                }
                Decision::from_requests(requests).with_response(response)
            }
            Err(e) if !conversation.has_decision() => {
                log::warn!("Tool selection failed ({}), falling back to keywords", e);
                let instruction = conversation.first_instruction().unwrap_or_default();
                Decision::from_requests(KeywordDecider::requests_for(instruction, document))
            }
            Err(e) => {
                log::error!("Tool selection failed: {}", e);
                Decision::default()
            }
        }
    }
}

/// Drives deciders and the executor through the Decide/Act cycle
pub struct OrchestrationGraph {
    executor: TaskExecutor,
    decider: Arc<dyn Decider>,
    cycle_budget: u32,
    mode: ExecutionMode,
}

impl OrchestrationGraph {
    pub fn new(executor: TaskExecutor, decider: Arc<dyn Decider>) -> Self {
        Self {
            executor,
            decider,
            cycle_budget: DEFAULT_CYCLE_BUDGET,
            mode: ExecutionMode::default(),
        }
    }

    pub fn with_cycle_budget(mut self, budget: u32) -> Self {
        self.cycle_budget = budget;
        self
    }

    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run the machine to completion.
    ///
    /// Only invalid input aborts the run; failed tasks are part of the results.
    pub async fn run(
        &self,
        instruction: &str,
        document: Arc<Document>,
    ) -> Result<GraphRun, CriticError> {
        let mut conversation = ConversationState::new(instruction);
        let mut budget = CycleBudget::new(self.cycle_budget);
        let mut stop = StopReason::NoPendingRequests;
        let mut state = GraphState::Decide;

        while state != GraphState::Done {
            state = match state {
                GraphState::Decide => {
                    if budget.is_exhausted() {
                        log::warn!(
                            "Cycle budget of {} exhausted, stopping with {} results",
                            self.cycle_budget,
                            conversation.results().len()
                        );
                        stop = StopReason::BudgetExhausted;
                        GraphState::Done
                    } else {
                        let mut decision = self.decider.decide(&conversation, &document).await;
                        let proposed = std::mem::take(&mut decision.requests);
                        decision.requests = Self::drop_satisfied(proposed, &conversation);
                        if decision.is_empty() {
                            GraphState::Done
                        } else {
                            log::info!(
                                "Decide: {} pending tasks: {:?}",
                                decision.requests.len(),
                                decision.requests.iter().map(|r| r.task).collect::<Vec<_>>()
                            );
                            conversation.push(Message::Decision(decision));
                            GraphState::Act
                        }
                    }
                }
                GraphState::Act => {
                    let pending = conversation.pending().to_vec();
                    for result in self.execute_batch(pending).await? {
                        conversation.push(Message::ToolResult(result));
                    }
                    budget.consume();
                    log::info!(
                        "Act: cycle {} complete, {} remaining",
                        budget.used(),
                        budget.remaining()
                    );
                    GraphState::Decide
                }
                GraphState::Done => GraphState::Done,
            };
        }

        Ok(GraphRun {
            results: conversation.results(),
            cycles: budget.used(),
            stop,
        })
    }

    fn drop_satisfied(
        proposed: Vec<TaskRequest>,
        conversation: &ConversationState,
    ) -> Vec<TaskRequest> {
        let mut seen = conversation.satisfied();
        proposed
            .into_iter()
            .filter(|r| {
                let fresh = seen.insert(r.task);
                if !fresh {
                    log::warn!("Skipping repeated request for {}", r.task);
                }
                fresh
            })
            .collect()
    }

    async fn execute_batch(
        &self,
        requests: Vec<TaskRequest>,
    ) -> Result<Vec<TaskResult>, CriticError> {
        match self.mode {
            ExecutionMode::Sequential => {
                let mut results = Vec::with_capacity(requests.len());
                for request in requests {
                    results.push(self.executor.execute(request).await?);
                }
                Ok(results)
            }
            // join_all yields in input order, not completion order
            ExecutionMode::Concurrent => join_all(
                requests
                    .into_iter()
                    .map(|request| self.executor.execute(request)),
            )
            .await
            .into_iter()
            .collect(),
        }
    }
}
