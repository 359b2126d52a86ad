//! crates/qa_testgen_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

/// Status assigned to every test case the model does not give one.
pub const DEFAULT_STATUS: &str = "Not Executed";

/// Priority assigned to every test case the model does not give one.
pub const DEFAULT_PRIORITY: &str = "Medium";

/// A single row of the generated test case table.
///
/// `priority` is kept as free text because the model is not bound to the
/// High/Medium/Low vocabulary; use [`PriorityLevel::classify`] to bucket it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub id: String,
    pub test_case_id: String,
    pub description: String,
    pub steps: String,
    pub expected_result: String,
    pub priority: String,
    pub status: String,
}

/// The three priority buckets used when presenting test cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    /// Case-insensitive classification. Anything that is not "high" or
    /// "medium" lands in `Low`.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("high") {
            PriorityLevel::High
        } else if trimmed.eq_ignore_ascii_case("medium") {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One exchange unit sent to or received from the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The ordered user/assistant history threaded through stateless calls.
///
/// The log is never mutated in place: appending consumes it and hands back
/// the extended log. System turns are prompt scaffolding and are dropped on
/// construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new(turns: Vec<ConversationTurn>) -> Self {
        let turns = turns
            .into_iter()
            .filter(|turn| turn.role != Role::System)
            .collect();
        Self { turns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the log extended by `turn`. System turns are ignored.
    pub fn with_turn(mut self, turn: ConversationTurn) -> Self {
        if turn.role != Role::System {
            self.turns.push(turn);
        }
        self
    }

    pub fn into_turns(self) -> Vec<ConversationTurn> {
        self.turns
    }
}

/// A user-supplied picture. Lives for a single request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Input to the generation endpoint.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub image: Option<UploadedImage>,
    pub requirements: String,
    pub history: ConversationLog,
}

/// Input to the refinement endpoint.
#[derive(Debug, Clone, Default)]
pub struct RefinementRequest {
    pub image: Option<UploadedImage>,
    pub requirements: String,
    pub history: ConversationLog,
    pub instruction: String,
}

/// What both endpoints hand back: the fresh result set and the extended log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutput {
    pub test_cases: Vec<TestCase>,
    pub history: ConversationLog,
}
