//! Reference-document upload adapter.
//!
//! Holds at most one active source per run; a later upload replaces it.
//! The control label mirrors the original button: busy while in flight,
//! a persistent "source added" affirmation on success, a transient failed
//! state that reverts after three seconds. Never retries.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::client::BackendClient;
use crate::error::CoachError;

/// How long the failed label stays before reverting to the initial one.
pub const FAILED_LABEL_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadLabel {
    Idle,
    Busy,
    Added,
    Failed,
}

impl UploadLabel {
    pub fn text(&self) -> &'static str {
        match self {
            UploadLabel::Idle => "Attach reference document",
            UploadLabel::Busy => "Extracting text...",
            UploadLabel::Added => "Source added ✓",
            UploadLabel::Failed => "Upload failed",
        }
    }
}

/// Uploaded-source state plus the label state machine around it.
pub struct DocumentSource {
    text: Option<String>,
    label: UploadLabel,
    failed_at: Option<Instant>,
}

impl DocumentSource {
    pub fn new() -> Self {
        DocumentSource {
            text: None,
            label: UploadLabel::Idle,
            failed_at: None,
        }
    }

    /// Extracted text of the active source, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.text.is_some()
    }

    /// Current label, with the failed state auto-reverting after its TTL.
    /// A successful earlier upload survives a later failure's revert.
    pub fn label(&mut self) -> UploadLabel {
        if self.label == UploadLabel::Failed {
            let expired = self
                .failed_at
                .map(|t| t.elapsed() >= FAILED_LABEL_TTL)
                .unwrap_or(true);
            if expired {
                self.failed_at = None;
                self.label = if self.text.is_some() {
                    UploadLabel::Added
                } else {
                    UploadLabel::Idle
                };
            }
        }
        self.label
    }

    /// Read the file and post it to the ingestion endpoint. Returns the
    /// extracted text length on success.
    pub async fn upload(
        &mut self,
        client: &BackendClient,
        path: &Path,
    ) -> Result<usize, CoachError> {
        self.label = UploadLabel::Busy;

        let outcome = self.do_upload(client, path).await;
        match outcome {
            Ok(len) => {
                self.label = UploadLabel::Added;
                self.failed_at = None;
                info!(path = %path.display(), text_len = len, "reference document ingested");
                Ok(len)
            }
            Err(e) => {
                self.label = UploadLabel::Failed;
                self.failed_at = Some(Instant::now());
                warn!(path = %path.display(), error = %e, "reference document upload failed");
                Err(e)
            }
        }
    }

    async fn do_upload(&mut self, client: &BackendClient, path: &Path) -> Result<usize, CoachError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let response = client.upload(&filename, bytes).await?;
        let len = response.text.len();
        self.text = Some(response.text);
        Ok(len)
    }
}

impl Default for DocumentSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BackendConfig;

    #[test]
    fn test_new_source_is_absent() {
        let s = DocumentSource::new();
        assert!(!s.is_present());
        assert!(s.text().is_none());
    }

    #[test]
    fn test_initial_label() {
        let mut s = DocumentSource::new();
        assert_eq!(s.label(), UploadLabel::Idle);
        assert_eq!(s.label().text(), "Attach reference document");
    }

    #[test]
    fn test_failed_label_reverts_to_idle_after_ttl() {
        let mut s = DocumentSource::new();
        s.label = UploadLabel::Failed;
        s.failed_at = Some(Instant::now() - FAILED_LABEL_TTL);
        assert_eq!(s.label(), UploadLabel::Idle);
    }

    #[test]
    fn test_failed_label_holds_within_ttl() {
        let mut s = DocumentSource::new();
        s.label = UploadLabel::Failed;
        s.failed_at = Some(Instant::now());
        assert_eq!(s.label(), UploadLabel::Failed);
    }

    #[test]
    fn test_failed_revert_preserves_added_affirmation() {
        let mut s = DocumentSource::new();
        s.text = Some("earlier source".to_string());
        s.label = UploadLabel::Failed;
        s.failed_at = Some(Instant::now() - FAILED_LABEL_TTL);
        assert_eq!(s.label(), UploadLabel::Added);
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails_without_network() {
        let client = BackendClient::new(BackendConfig::new("http://127.0.0.1:1")).expect("client");
        let mut s = DocumentSource::new();
        let err = s
            .upload(&client, Path::new("/nonexistent/notes.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::Io(_)));
        assert_eq!(s.label, UploadLabel::Failed);
        assert!(!s.is_present());
    }
}
