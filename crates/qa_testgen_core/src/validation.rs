//! crates/qa_testgen_core/src/validation.rs
//!
//! Caller-fixable input checks. Every check here runs before the completion
//! service is contacted.

use crate::domain::UploadedImage;

/// Largest accepted screenshot, in bytes (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type. Please upload an image file (PNG, JPG, GIF, etc.)")]
    InvalidFileType { media_type: String },

    #[error(
        "File size ({}MB) exceeds the 10MB limit. Please upload a smaller image.",
        format_megabytes(*.size_bytes)
    )]
    FileTooLarge { size_bytes: usize },

    #[error("Please provide either a screenshot or text input")]
    NoInput,

    #[error("Please provide a message to refine the test cases")]
    NoInstruction,

    #[error("Chat history is not valid: {0}")]
    InvalidHistory(String),
}

impl ValidationError {
    /// Stable machine-readable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ValidationError::NoInput => "NO_INPUT",
            ValidationError::NoInstruction => "NO_INSTRUCTION",
            ValidationError::InvalidHistory(_) => "INVALID_HISTORY",
        }
    }
}

/// Renders a byte count as megabytes with two decimals, e.g. `10.50`.
pub fn format_megabytes(size_bytes: usize) -> String {
    format!("{:.2}", size_bytes as f64 / 1024.0 / 1024.0)
}

/// Type is checked before size.
pub fn validate_upload(media_type: &str, size_bytes: usize) -> Result<(), ValidationError> {
    if !media_type.starts_with("image/") {
        return Err(ValidationError::InvalidFileType {
            media_type: media_type.to_string(),
        });
    }
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(ValidationError::FileTooLarge { size_bytes });
    }
    Ok(())
}

pub fn validate_image(image: &UploadedImage) -> Result<(), ValidationError> {
    validate_upload(&image.media_type, image.size_bytes())
}

pub fn validate_optional_image(image: Option<&UploadedImage>) -> Result<(), ValidationError> {
    image.map_or(Ok(()), validate_image)
}

/// Generation needs a screenshot or some non-blank requirements.
pub fn require_input(
    image: Option<&UploadedImage>,
    requirements: &str,
) -> Result<(), ValidationError> {
    if image.is_none() && requirements.trim().is_empty() {
        return Err(ValidationError::NoInput);
    }
    Ok(())
}

pub fn require_instruction(instruction: &str) -> Result<(), ValidationError> {
    if instruction.trim().is_empty() {
        return Err(ValidationError::NoInstruction);
    }
    Ok(())
}
