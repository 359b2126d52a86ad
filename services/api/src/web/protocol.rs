//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API
//! server, and their conversions to and from the core domain types.

use qa_testgen_core::domain::{ConversationLog, ConversationTurn, Role, TestCase};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Shared Records
//=========================================================================================

/// One row of the test case table as the browser sees it.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TestCaseDto {
    pub id: String,
    pub test_case_id: String,
    pub description: String,
    pub steps: String,
    pub expected_result: String,
    pub priority: String,
    pub status: String,
}

impl From<TestCase> for TestCaseDto {
    fn from(tc: TestCase) -> Self {
        Self {
            id: tc.id,
            test_case_id: tc.test_case_id,
            description: tc.description,
            steps: tc.steps,
            expected_result: tc.expected_result,
            priority: tc.priority,
            status: tc.status,
        }
    }
}

impl From<TestCaseDto> for TestCase {
    fn from(dto: TestCaseDto) -> Self {
        Self {
            id: dto.id,
            test_case_id: dto.test_case_id,
            description: dto.description,
            steps: dto.steps,
            expected_result: dto.expected_result,
            priority: dto.priority,
            status: dto.status,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One `{role, content}` entry of the chat history.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnDto {
    pub role: ChatRole,
    pub content: String,
}

impl From<ChatTurnDto> for ConversationTurn {
    fn from(dto: ChatTurnDto) -> Self {
        let role = match dto.role {
            ChatRole::System => Role::System,
            ChatRole::User => Role::User,
            ChatRole::Assistant => Role::Assistant,
        };
        Self {
            role,
            content: dto.content,
        }
    }
}

impl From<ConversationTurn> for ChatTurnDto {
    fn from(turn: ConversationTurn) -> Self {
        let role = match turn.role {
            Role::System => ChatRole::System,
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        };
        Self {
            role,
            content: turn.content,
        }
    }
}

/// System entries are dropped by `ConversationLog::new`.
pub fn to_conversation_log(turns: Vec<ChatTurnDto>) -> ConversationLog {
    ConversationLog::new(turns.into_iter().map(ConversationTurn::from).collect())
}

pub fn from_conversation_log(log: ConversationLog) -> Vec<ChatTurnDto> {
    log.into_turns().into_iter().map(ChatTurnDto::from).collect()
}

//=========================================================================================
// Request and Response Payloads
//=========================================================================================

/// The response payload of both `/api/generate` and `/api/chat`.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TestCasesResponse {
    pub test_cases: Vec<TestCaseDto>,
    pub chat_history: Vec<ChatTurnDto>,
}

/// The request payload of the export endpoints.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub test_cases: Vec<TestCaseDto>,
}

/// Every failed request answers with this body.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable code, e.g. `FILE_TOO_LARGE`.
    pub code: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    pub status: String,
}
