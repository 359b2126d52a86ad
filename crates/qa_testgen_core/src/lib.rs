pub mod domain;
pub mod parser;
pub mod ports;
pub mod prompts;
pub mod validation;
pub mod workflow;

pub use domain::{
    ConversationLog, ConversationTurn, GenerationRequest, PriorityLevel, RefinementRequest, Role,
    TestCase, UploadedImage, WorkflowOutput,
};
pub use ports::{CompletionRequest, CompletionService, PortError, PortResult, TestCaseExporter};
pub use validation::ValidationError;
pub use workflow::{CompletionSettings, TestCaseWorkflow, WorkflowError};
