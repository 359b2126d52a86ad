//! crates/qa_testgen_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the hosted model API and the document writer libraries.

use crate::domain::{ConversationTurn, TestCase};
use async_trait::async_trait;
use std::time::Duration;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, encoders).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The service cannot be used at all, e.g. its credential is absent.
    #[error("Service misconfigured: {0}")]
    Misconfigured(String),
    #[error("Completion service did not respond within {} seconds", .0.as_secs())]
    Timeout(Duration),
    /// The external service answered with a fault or could not be reached.
    #[error("Completion service error: {0}")]
    Service(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A fully assembled prompt plus sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ConversationTurn>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends the turn sequence and returns the model's raw text.
    async fn complete(&self, request: CompletionRequest) -> PortResult<String>;
}

/// Serializes a result set into a downloadable document.
pub trait TestCaseExporter: Send + Sync {
    /// File name offered to the browser, e.g. `test_cases.csv`.
    fn file_name(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    fn encode(&self, test_cases: &[TestCase]) -> PortResult<Vec<u8>>;
}
