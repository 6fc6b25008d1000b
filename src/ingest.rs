use base64::prelude::*;
use bytes::Bytes;
use mime_guess::MimeGuess;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::model::{is_image_mime, EncodedImage};

/// Where a candidate's content comes from
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Bytes),
}

/// A file offered for ingestion, with the content type it declares
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub source: FileSource,
}

impl CandidateFile {
    /// Candidate on disk; the content type is guessed from the extension
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = MimeGuess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        Self {
            name,
            content_type,
            source: FileSource::Path(path),
        }
    }

    /// In-memory candidate with an explicitly declared content type
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            source: FileSource::Bytes(data.into()),
        }
    }

    /// In-memory candidate whose content type is detected from magic bytes
    pub fn sniff(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let content_type = infer::get(&data)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Self::from_bytes(name, content_type, data)
    }

    async fn read(&self) -> std::io::Result<Bytes> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
            FileSource::Bytes(data) => Ok(data.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnImage { content_type: String },
    ReadFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnImage { content_type } => {
                write!(f, "not an image (content type '{}')", content_type)
            }
            SkipReason::ReadFailed(msg) => write!(f, "could not be read: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: SkipReason,
}

/// Accepted images plus what was dropped and why
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub images: Vec<EncodedImage>,
    pub skipped: Vec<SkippedFile>,
}

impl IngestReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Turn candidates into encoded images, silently dropping the rest.
pub async fn ingest_files(files: impl IntoIterator<Item = CandidateFile>) -> Vec<EncodedImage> {
    ingest_files_with_report(files).await.images
}

/// Like [`ingest_files`], but also reports every skipped candidate.
///
/// Candidates are processed in order. A non-image or unreadable file never
/// stops the remaining ones.
pub async fn ingest_files_with_report(
    files: impl IntoIterator<Item = CandidateFile>,
) -> IngestReport {
    let mut report = IngestReport::default();

    for file in files {
        if !is_image_mime(&file.content_type) {
            warn!(file = %file.name, content_type = %file.content_type, "skipping non-image file");
            report.skipped.push(SkippedFile {
                name: file.name,
                reason: SkipReason::NotAnImage {
                    content_type: file.content_type,
                },
            });
            continue;
        }

        let data = match file.read().await {
            Ok(data) => data,
            Err(e) => {
                warn!(file = %file.name, error = %e, "failed to read file");
                report.skipped.push(SkippedFile {
                    name: file.name,
                    reason: SkipReason::ReadFailed(e.to_string()),
                });
                continue;
            }
        };

        report.images.push(EncodedImage::accepted(
            file.name,
            file.content_type,
            BASE64_STANDARD.encode(&data),
        ));
    }

    info!(
        accepted = report.images.len(),
        skipped = report.skipped.len(),
        "ingested files"
    );
    report
}
