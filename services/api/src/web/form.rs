//! services/api/src/web/form.rs
//!
//! Decodes the multipart form shared by `/api/generate` and `/api/chat`.
//!
//! Recognized parts: `screenshot` (file), `textInput`, `chatHistory` (a JSON
//! array of `{role, content}`), and `userMessage`. Unknown parts are skipped.

use crate::web::protocol::{to_conversation_log, ChatTurnDto};
use axum::{
    extract::{multipart::Field, Multipart},
    http::StatusCode,
};
use qa_testgen_core::domain::{ConversationLog, UploadedImage};
use qa_testgen_core::validation::{validate_upload, ValidationError, MAX_IMAGE_BYTES};
use tracing::debug;

/// Everything a browser submits with a generate or chat request.
#[derive(Debug, Default)]
pub struct TestCaseForm {
    pub screenshot: Option<UploadedImage>,
    pub text_input: String,
    pub chat_history: ConversationLog,
    pub user_message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The body is not a readable multipart form.
    #[error("Failed to read multipart data: {message}")]
    Malformed {
        status: StatusCode,
        message: String,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<axum::extract::multipart::MultipartError> for FormError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        FormError::Malformed {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

/// Empty or absent history means a fresh conversation.
pub fn parse_chat_history(raw: &str) -> Result<ConversationLog, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(ConversationLog::empty());
    }
    let turns: Vec<ChatTurnDto> =
        serde_json::from_str(raw).map_err(|e| ValidationError::InvalidHistory(e.to_string()))?;
    Ok(to_conversation_log(turns))
}

/// Streams the screenshot part. At most `MAX_IMAGE_BYTES` are buffered; past
/// that the part is only measured so the rejection can report its full size.
async fn read_screenshot(mut field: Field<'_>) -> Result<Option<UploadedImage>, FormError> {
    let media_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut bytes = Vec::new();
    let mut size_bytes = 0usize;
    while let Some(chunk) = field.chunk().await? {
        size_bytes += chunk.len();
        if size_bytes <= MAX_IMAGE_BYTES {
            bytes.extend_from_slice(&chunk);
        }
    }

    // Browsers send an empty part when no file was picked.
    if size_bytes == 0 {
        return Ok(None);
    }
    debug!("Received screenshot of {} bytes ({}).", size_bytes, media_type);
    if size_bytes > MAX_IMAGE_BYTES {
        validate_upload(&media_type, size_bytes)?;
    }
    Ok(Some(UploadedImage::new(bytes, media_type)))
}

/// Reads a text part, charging its length against the shared budget.
async fn read_text(mut field: Field<'_>, budget: &mut usize) -> Result<String, FormError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if chunk.len() > *budget {
            return Err(FormError::Malformed {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "Text fields exceed the request size limit".to_string(),
            });
        }
        *budget -= chunk.len();
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|e| FormError::Malformed {
        status: StatusCode::BAD_REQUEST,
        message: e.to_string(),
    })
}

/// Decodes the form. The screenshot is bounded by `MAX_IMAGE_BYTES`; all
/// other parts together are bounded by `text_limit`.
pub async fn read_form(
    mut multipart: Multipart,
    text_limit: usize,
) -> Result<TestCaseForm, FormError> {
    let mut form = TestCaseForm::default();
    let mut budget = text_limit;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "screenshot" => form.screenshot = read_screenshot(field).await?,
            "textInput" => form.text_input = read_text(field, &mut budget).await?,
            "chatHistory" => {
                form.chat_history = parse_chat_history(&read_text(field, &mut budget).await?)?
            }
            "userMessage" => form.user_message = read_text(field, &mut budget).await?,
            other => debug!("Ignoring unknown form part '{}'.", other),
        }
    }

    Ok(form)
}
