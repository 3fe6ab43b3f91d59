use chrono::{DateTime, Utc};
use serde::Serialize;

use super::attachments::{Attachment, AttachmentId, AttachmentKind};
use super::domain::VerificationRecord;

/// Reference returned by the storage collaborator for an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub attachment_id: AttachmentId,
    pub kind: AttachmentKind,
    pub storage_key: String,
}

/// Everything handed to the data store at the end of the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationSubmission {
    pub record: VerificationRecord,
    pub files: Vec<StoredFile>,
}

/// Acknowledgement from the data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub verification_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// Persistence collaborator; the wizard's only write.
pub trait VerificationSubmitter: Send + Sync {
    fn submit(
        &self,
        submission: &VerificationSubmission,
    ) -> Result<SubmissionReceipt, RepositoryError>;
}

/// File storage collaborator for thumbnails, portfolio images and certificates.
pub trait FileStorage: Send + Sync {
    fn store(&self, attachment: &Attachment) -> Result<StoredFile, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file '{file_name}' rejected by storage: {reason}")]
    Rejected { file_name: String, reason: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
