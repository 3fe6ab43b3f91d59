//! Owned file handles for thumbnails, portfolio images and certificates.
//!
//! Bytes stay in memory until submission hands them to the storage collaborator. A preview
//! URL is minted lazily and must be released explicitly once the view no longer needs it.

use std::sync::atomic::{AtomicU64, Ordering};

use mime::Mime;
use serde::{Serialize, Serializer};

static ATTACHMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_attachment_id() -> AttachmentId {
    let id = ATTACHMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AttachmentId(format!("att-{id:06}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AttachmentId(pub String);

/// Where an attachment is going to be used, which decides the accepted media types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Thumbnail,
    PortfolioImage,
    Certificate,
}

impl AttachmentKind {
    pub fn accepts(self, content_type: &Mime) -> bool {
        let essence = content_type.essence_str();
        match self {
            AttachmentKind::Thumbnail | AttachmentKind::PortfolioImage => {
                essence == mime::IMAGE_JPEG.essence_str()
                    || essence == mime::IMAGE_PNG.essence_str()
                    || essence == mime::IMAGE_GIF.essence_str()
            }
            AttachmentKind::Certificate => {
                essence == mime::APPLICATION_PDF.essence_str()
                    || essence == mime::IMAGE_JPEG.essence_str()
                    || essence == mime::IMAGE_PNG.essence_str()
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("{content_type} is not accepted for {kind:?} uploads")]
    UnsupportedType {
        kind: AttachmentKind,
        content_type: String,
    },
    #[error("uploaded file '{0}' is empty")]
    Empty(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    id: AttachmentId,
    kind: AttachmentKind,
    file_name: String,
    content_type: Mime,
    bytes: Vec<u8>,
    preview: Option<String>,
}

impl Attachment {
    pub fn new(
        kind: AttachmentKind,
        file_name: impl Into<String>,
        content_type: Mime,
        bytes: Vec<u8>,
    ) -> Result<Self, AttachmentError> {
        let file_name = file_name.into();
        if !kind.accepts(&content_type) {
            return Err(AttachmentError::UnsupportedType {
                kind,
                content_type: content_type.to_string(),
            });
        }
        if bytes.is_empty() {
            return Err(AttachmentError::Empty(file_name));
        }

        Ok(Self {
            id: next_attachment_id(),
            kind,
            file_name,
            content_type,
            bytes,
            preview: None,
        })
    }

    pub fn id(&self) -> &AttachmentId {
        &self.id
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Mint the preview URL on first use and reuse it afterwards.
    pub fn preview_url(&mut self) -> &str {
        let id = &self.id;
        self.preview
            .get_or_insert_with(|| format!("blob:waqti/{}", id.0))
    }

    pub fn has_live_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Revoke the preview URL. Returns whether one was live.
    pub fn release_preview(&mut self) -> bool {
        self.preview.take().is_some()
    }
}

#[derive(Serialize)]
struct AttachmentView<'a> {
    id: &'a str,
    kind: AttachmentKind,
    file_name: &'a str,
    content_type: String,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview_url: Option<&'a str>,
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AttachmentView {
            id: &self.id.0,
            kind: self.kind,
            file_name: &self.file_name,
            content_type: self.content_type.to_string(),
            size: self.bytes.len(),
            preview_url: self.preview.as_deref(),
        }
        .serialize(serializer)
    }
}
