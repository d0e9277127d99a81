//! Error types for publish operations.

use std::path::PathBuf;

use crate::error::ConfluenceError;

/// Error while publishing, updating or reading content.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// A local attachment could not be read.
    #[error("cannot read attachment {}: {source}", path.display())]
    Attachment {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The target space has no homepage to publish under.
    #[error("space {0} has no homepage")]
    MissingHomepage(String),

    /// The content is neither a page nor a blog post.
    #[error("content {id} is a {content_type}, not a page or blog post")]
    UnsupportedContent {
        /// Content ID.
        id: String,
        /// Reported content type.
        content_type: String,
    },
}
