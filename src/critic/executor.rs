// SPDX-License-Identifier: MIT

//! Task executor - runs one review pass against the model

use crate::adk::error::CriticError;
use crate::adk::model::{GenerationConfig, Model};
use crate::critic::registry::TaskRegistry;
use crate::critic::task::{TaskRequest, TaskResult};
use std::sync::Arc;

/// Runs task requests through the registry's prompts and the model
#[derive(Clone)]
pub struct TaskExecutor {
    registry: Arc<TaskRegistry>,
    model: Arc<dyn Model>,
    generation: Option<GenerationConfig>,
}

impl TaskExecutor {
    pub fn new(registry: Arc<TaskRegistry>, model: Arc<dyn Model>) -> Self {
        Self {
            registry,
            model,
            generation: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation = Some(config);
        self
    }

    /// Execute one request with exactly one model call.
    ///
    /// Model failures come back as a failed [`TaskResult`]; only prompt
    /// construction errors (invalid input) are returned as `Err`, and in that
    /// case the model is never called.
    pub async fn execute(&self, request: TaskRequest) -> Result<TaskResult, CriticError> {
        let TaskRequest {
            call_id,
            task,
            document,
            focus,
        } = request;

        let prompt = self
            .registry
            .build_prompt(task, &document, focus.as_deref())?;

        log::info!("Executing task: {} ({})", task, call_id);
        match self.model.invoke(&prompt, self.generation.as_ref()).await {
            Ok(text) => {
                log::info!("Task {} completed ({} chars)", task, text.chars().count());
                Ok(TaskResult::completed(call_id, task, text))
            }
            Err(e) => {
                log::error!("Task {} failed: {}", task, e);
                Ok(TaskResult::failed(call_id, task, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::error::ModelError;
    use crate::adk::model::{Content, Part};
    use crate::adk::tool::Tool;
    use crate::critic::document::Document;
    use crate::critic::task::{TaskName, TaskOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed text, or fails
    struct RecordingModel {
        reply: Option<String>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Model for RecordingModel {
        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
            _tools: Option<&[Arc<dyn Tool>]>,
        ) -> Result<Content, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(history[0].text());
            match &self.reply {
                Some(text) => Ok(Content {
                    role: "model".to_string(),
                    parts: vec![Part::Text(text.clone())],
                }),
                None => Err(ModelError::RateLimited {
                    retry_after_secs: Some(5),
                }),
            }
        }
    }

    fn request(task: TaskName, len: usize) -> TaskRequest {
        let doc = Arc::new(Document::new("a".repeat(len), Some("skills".to_string())));
        TaskRequest::new(task, doc)
    }

    #[tokio::test]
    async fn test_completion_captured_verbatim() {
        let model = Arc::new(RecordingModel::replying("  **Roast**\nBhai...  "));
        let executor = TaskExecutor::new(Arc::new(TaskRegistry::default()), model.clone());

        let req = request(TaskName::Roast, 150);
        let call_id = req.call_id.clone();
        let result = executor.execute(req).await.unwrap();

        assert_eq!(result.task, TaskName::Roast);
        assert_eq!(result.call_id, call_id);
        assert_eq!(
            result.outcome,
            TaskOutcome::Completed("  **Roast**\nBhai...  ".to_string())
        );
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("**Roast Section**"));
        assert!(prompts[0].contains("Focus Area: skills"));
    }

    #[tokio::test]
    async fn test_model_failure_becomes_failed_result() {
        let model = Arc::new(RecordingModel::failing());
        let executor = TaskExecutor::new(Arc::new(TaskRegistry::default()), model.clone());

        let result = executor
            .execute(request(TaskName::Feedback, 150))
            .await
            .unwrap();

        assert!(!result.is_success());
        match result.outcome {
            TaskOutcome::Failed(reason) => assert!(reason.contains("Rate limit")),
            _ => panic!("Expected failed outcome"),
        }
        // No internal retry
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_skips_model() {
        let model = Arc::new(RecordingModel::replying("unused"));
        let executor = TaskExecutor::new(Arc::new(TaskRegistry::default()), model.clone());

        let err = executor
            .execute(request(TaskName::Appreciation, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, CriticError::InvalidInput(_)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
