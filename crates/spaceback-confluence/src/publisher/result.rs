//! Result types for publish operations.

use crate::types::ContentKind;

/// Outcome of creating or updating content.
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Content ID.
    pub id: String,
    /// Title after the operation.
    pub title: String,
    /// Page or blog post.
    pub kind: ContentKind,
    /// Version after the operation.
    pub version: u32,
    /// Web URL.
    pub url: String,
    /// Number of labels added.
    pub labels_added: usize,
    /// Number of attachments uploaded.
    pub attachments_uploaded: usize,
}

/// Current state of a content item.
#[derive(Debug, Clone)]
pub struct ContentSnapshot {
    /// Content ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Page or blog post.
    pub kind: ContentKind,
    /// Key of the owning space, if reported.
    pub space_key: Option<String>,
    /// Current version.
    pub version: u32,
    /// Label names.
    pub labels: Vec<String>,
    /// Body in storage format.
    pub body: String,
    /// Web URL.
    pub url: String,
}
