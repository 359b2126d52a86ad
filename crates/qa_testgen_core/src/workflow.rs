//! crates/qa_testgen_core/src/workflow.rs
//!
//! The generation and refinement endpoints. Both validate their input, build a
//! prompt, make exactly one bounded call to the completion service, and parse
//! the reply. They differ only in prompt shape and in how a reply that cannot
//! be decoded is degraded.

use crate::domain::{ConversationTurn, GenerationRequest, RefinementRequest, WorkflowOutput};
use crate::parser::{parse_with_policy, FailurePolicy};
use crate::ports::{CompletionRequest, CompletionService, PortError, PortResult};
use crate::prompts::{generation_messages, refinement_messages};
use crate::validation::{
    require_input, require_instruction, validate_optional_image, ValidationError,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Sampling and time budget for every completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Port(#[from] PortError),
}

impl WorkflowError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::Validation(err) => err.code(),
            WorkflowError::Port(PortError::Misconfigured(_)) => "SERVICE_MISCONFIGURED",
            WorkflowError::Port(PortError::Timeout(_)) => "SERVICE_TIMEOUT",
            WorkflowError::Port(_) => "SERVICE_ERROR",
        }
    }
}

/// Stateless: every call is a function of its request and the injected service.
#[derive(Clone)]
pub struct TestCaseWorkflow {
    completion: Arc<dyn CompletionService>,
    settings: CompletionSettings,
}

impl TestCaseWorkflow {
    pub fn new(completion: Arc<dyn CompletionService>, settings: CompletionSettings) -> Self {
        Self {
            completion,
            settings,
        }
    }

    /// Produces a fresh result set from a screenshot and/or requirements.
    ///
    /// The returned log is the input log plus one assistant turn holding the
    /// raw reply. A reply that cannot be decoded yields the fallback record.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<WorkflowOutput, WorkflowError> {
        let GenerationRequest {
            image,
            requirements,
            history,
        } = request;
        validate_optional_image(image.as_ref())?;
        require_input(image.as_ref(), &requirements)?;

        let messages = generation_messages(image.is_some(), &requirements, &history);
        let raw = self.invoke(messages).await?;

        let (test_cases, failure) = parse_with_policy(&raw, FailurePolicy::Fallback);
        if let Some(err) = failure {
            warn!("Generation reply could not be parsed, using fallback record: {}", err);
            debug!("Unparsed generation reply:\n{}", raw);
        }
        info!("Generated {} test case(s).", test_cases.len());

        Ok(WorkflowOutput {
            test_cases,
            history: history.with_turn(ConversationTurn::assistant(raw)),
        })
    }

    /// Revises the result set following a new user instruction.
    ///
    /// The returned log is the input log plus the instruction and the raw
    /// reply. A reply that cannot be decoded yields an empty list so the
    /// caller can keep what it already shows.
    pub async fn refine(
        &self,
        request: RefinementRequest,
    ) -> Result<WorkflowOutput, WorkflowError> {
        let RefinementRequest {
            image,
            requirements,
            history,
            instruction,
        } = request;
        validate_optional_image(image.as_ref())?;
        require_instruction(&instruction)?;

        let messages =
            refinement_messages(image.is_some(), &requirements, &history, &instruction);
        let raw = self.invoke(messages).await?;

        let (test_cases, failure) = parse_with_policy(&raw, FailurePolicy::Empty);
        if let Some(err) = failure {
            warn!("Refinement reply could not be parsed, returning no test cases: {}", err);
            debug!("Unparsed refinement reply:\n{}", raw);
        }
        info!("Refinement produced {} test case(s).", test_cases.len());

        Ok(WorkflowOutput {
            test_cases,
            history: history
                .with_turn(ConversationTurn::user(instruction))
                .with_turn(ConversationTurn::assistant(raw)),
        })
    }

    async fn invoke(&self, messages: Vec<ConversationTurn>) -> PortResult<String> {
        let request = CompletionRequest {
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let turns = request.messages.len();
        let start_time = Instant::now();

        let reply = tokio::time::timeout(self.settings.timeout, self.completion.complete(request))
            .await
            .map_err(|_| PortError::Timeout(self.settings.timeout))??;

        info!(
            "Completion call with {} turn(s) answered in {:?}.",
            turns,
            start_time.elapsed()
        );
        Ok(reply)
    }
}
