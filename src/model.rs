use base64::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PromptsmithError;

/// An accepted image file, held as base64 text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    /// Unique identifier assigned at ingestion time
    pub id: Uuid,
    /// Original filename as supplied by the user
    pub filename: String,
    /// MIME type, always starting with `image/`
    pub mime_type: String,
    /// Binary content as standard base64
    pub base64: String,
}

impl EncodedImage {
    /// Create an image from raw bytes with a fresh id.
    ///
    /// Fails with `UnsupportedFormat` when the MIME type is not `image/*`.
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        data: &[u8],
    ) -> Result<Self, PromptsmithError> {
        Self::from_base64(filename, mime_type, BASE64_STANDARD.encode(data))
    }

    /// Create an image from content that is already base64 encoded
    pub fn from_base64(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        base64: impl Into<String>,
    ) -> Result<Self, PromptsmithError> {
        let filename = filename.into();
        let mime_type = mime_type.into();
        if !is_image_mime(&mime_type) {
            return Err(PromptsmithError::UnsupportedFormat(format!(
                "{} has content type '{}'",
                filename, mime_type
            )));
        }

        Ok(Self::accepted(filename, mime_type, base64.into()))
    }

    // Caller has already checked the MIME type.
    pub(crate) fn accepted(filename: String, mime_type: String, base64: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            mime_type,
            base64,
        }
    }

    /// Size of the decoded binary content in bytes
    pub fn decoded_len(&self) -> usize {
        let padding = self.base64.bytes().rev().take_while(|b| *b == b'=').count();
        ((self.base64.len() / 4) * 3).saturating_sub(padding.min(2))
    }

    /// `data:` URL suitable for embedding the image in a view
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// True for declared content types the workflow accepts
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Lifecycle position of a record.
///
/// `Idle -> Loading -> Succeeded | Failed`, and back to `Loading` on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Idle,
    Loading,
    Succeeded(String),
    Failed(String),
}

/// Per-image reverse-prompt state.
///
/// Only the workflow moves a record between states; everything else reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    image: EncodedImage,
    status: Status,
}

impl PromptRecord {
    pub fn new(image: EncodedImage) -> Self {
        Self {
            image,
            status: Status::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.image.id
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    pub fn state(&self) -> RecordState {
        match self.status {
            Status::Idle => RecordState::Idle,
            Status::Loading => RecordState::Loading,
            Status::Succeeded(_) => RecordState::Succeeded,
            Status::Failed(_) => RecordState::Failed,
        }
    }

    /// Generated prompt, empty until a generation succeeds
    pub fn prompt(&self) -> &str {
        match &self.status {
            Status::Succeeded(prompt) => prompt,
            _ => "",
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == Status::Idle
    }

    // Clears any previous prompt or error.
    pub(crate) fn start_loading(&mut self) {
        self.status = Status::Loading;
    }

    pub(crate) fn succeed(&mut self, prompt: String) {
        self.status = Status::Succeeded(prompt);
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.status = Status::Failed(message);
    }

    /// Flatten into the shape the view layer renders
    pub fn to_view(&self) -> RecordView {
        RecordView {
            id: self.image.id,
            filename: self.image.filename.clone(),
            mime_type: self.image.mime_type.clone(),
            base64: self.image.base64.clone(),
            state: self.state(),
            prompt: self.prompt().to_string(),
            is_loading: self.is_loading(),
            error: self.error().map(str::to_string),
        }
    }
}

/// Read-only view of a record, including the image content to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    /// Empty when the content was stripped for compact output
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base64: String,
    pub state: RecordState,
    pub prompt: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_image_mime() {
        let err = EncodedImage::new("notes.txt", "text/plain", b"hello").unwrap_err();
        assert!(matches!(err, PromptsmithError::UnsupportedFormat(_)));
    }

    #[test]
    fn decoded_len_accounts_for_padding() {
        let cases: [&[u8]; 5] = [b"", b"a", b"ab", b"abc", b"abcd"];
        for data in cases {
            let image = EncodedImage::new("x.png", "image/png", data).unwrap();
            assert_eq!(image.decoded_len(), data.len());
        }
    }

    #[test]
    fn record_transitions_clear_previous_result() {
        let image = EncodedImage::new("x.png", "image/png", b"png").unwrap();
        let mut record = PromptRecord::new(image);
        assert_eq!(record.state(), RecordState::Idle);

        record.start_loading();
        record.fail("boom".to_string());
        assert_eq!(record.error(), Some("boom"));
        assert_eq!(record.prompt(), "");

        record.start_loading();
        assert!(record.is_loading());
        assert_eq!(record.error(), None);

        record.succeed("a cat on a mat".to_string());
        assert_eq!(record.state(), RecordState::Succeeded);
        assert_eq!(record.to_view().prompt, "a cat on a mat");
        assert_eq!(record.to_view().base64, record.image().base64);
    }
}
