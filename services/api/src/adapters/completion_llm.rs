//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the hosted chat-completion LLM.
//! It implements the `CompletionService` port from the `core` crate against any
//! OpenAI-compatible endpoint (Groq by default).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use qa_testgen_core::{
    domain::{ConversationTurn, Role},
    ports::{CompletionRequest, CompletionService, PortError, PortResult},
};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
///
/// The adapter can be built without a credential so the server still starts;
/// every call then fails with `PortError::Misconfigured`.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(api_key: Option<&str>, api_base: &str, model: String) -> Self {
        let client = api_key.map(|key| {
            Client::with_config(
                OpenAIConfig::new()
                    .with_api_key(key)
                    .with_api_base(api_base),
            )
        });
        Self { client, model }
    }

    fn to_openai_message(turn: &ConversationTurn) -> PortResult<ChatCompletionRequestMessage> {
        let content = turn.content.clone();
        let message = match turn.role {
            Role::System => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(content)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            Role::User => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(content)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            Role::Assistant => ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(content)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
        };
        Ok(message)
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    /// Sends the whole turn sequence and returns the first choice's text.
    async fn complete(&self, request: CompletionRequest) -> PortResult<String> {
        let client = self.client.as_ref().ok_or_else(|| {
            PortError::Misconfigured(
                "GROQ_API_KEY is not configured. Please check your .env file.".to_string(),
            )
        })?;

        let messages = request
            .messages
            .iter()
            .map(Self::to_openai_message)
            .collect::<PortResult<Vec<_>>>()?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!("Sending {} turn(s) to model {}.", request.messages.len(), self.model);

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PortError::Service(e.to_string()))?;

        // A choice without content is an empty reply; the parser degrades it.
        match response.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content.unwrap_or_default()),
            None => Err(PortError::Service(
                "Completion service returned no choices in its response.".to_string(),
            )),
        }
    }
}
