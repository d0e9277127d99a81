//! Publishing pages and blog posts.
//!
//! [`ContentPublisher`] wraps the workflow around a single content item:
//!
//! 1. Create the page or blog post (or fetch the current version for an update)
//! 2. Add labels
//! 3. Upload attachments from local files
//! 4. Report the resulting version and URL
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use spaceback_confluence::{
//!     ConfluenceClient, ContentDraft, ContentKind, ContentPublisher, Credentials, ParentPage,
//! };
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &Credentials::new("jdoe", "secret"),
//!     Duration::from_secs(30),
//! );
//! let publisher = ContentPublisher::new(&client);
//!
//! let draft = ContentDraft {
//!     kind: ContentKind::Page,
//!     space_key: "OPS".to_owned(),
//!     title: "Runbook".to_owned(),
//!     body: "<p>Restart the service.</p>".to_owned(),
//!     parent: ParentPage::SpaceHome,
//!     labels: vec!["howto".to_owned()],
//!     attachments: Vec::new(),
//! };
//! let result = publisher.publish(&draft)?;
//! println!("{}", result.url);
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod result;

pub use error::PublishError;
pub use executor::ContentPublisher;
pub use result::{ContentSnapshot, PublishResult};

use std::path::{Path, PathBuf};

use crate::types::ContentKind;

/// Where a new page is placed in the page tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParentPage {
    /// Top level of the space.
    #[default]
    None,
    /// Under an explicit page.
    Page(String),
    /// Under the space homepage.
    SpaceHome,
}

/// A page or blog post to publish.
#[derive(Debug, Clone)]
pub struct ContentDraft {
    /// Page or blog post.
    pub kind: ContentKind,
    /// Key of the target space.
    pub space_key: String,
    /// Title.
    pub title: String,
    /// Body in storage format.
    pub body: String,
    /// Placement of a page; ignored for blog posts.
    pub parent: ParentPage,
    /// Labels to add.
    pub labels: Vec<String>,
    /// Local files to attach.
    pub attachments: Vec<PathBuf>,
}

/// Changes to apply to existing content. Unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ContentChange {
    /// New title.
    pub title: Option<String>,
    /// New body in storage format.
    pub body: Option<String>,
    /// Version comment.
    pub message: Option<String>,
    /// Labels to add.
    pub labels: Vec<String>,
    /// Local files to attach.
    pub attachments: Vec<PathBuf>,
}

/// Normalize label arguments.
///
/// Each value may itself be a comma-separated list. Surrounding whitespace is
/// trimmed and blank entries are dropped; order is kept and duplicates are
/// removed.
#[must_use]
pub fn parse_labels<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for value in values {
        for label in value.as_ref().split(',').map(str::trim) {
            if !label.is_empty() && !labels.iter().any(|l| l == label) {
                labels.push(label.to_owned());
            }
        }
    }
    labels
}

/// MIME type used when uploading `path`.
#[must_use]
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_labels_comma_separated() {
        assert_eq!(
            parse_labels(&["release, ops,,  howto "]),
            vec!["release", "ops", "howto"]
        );
    }

    #[test]
    fn test_parse_labels_repeated_values_deduplicated() {
        assert_eq!(
            parse_labels(&["ops".to_owned(), "release,ops".to_owned(), " ".to_owned()]),
            vec!["ops", "release"]
        );
    }

    #[test]
    fn test_parse_labels_empty() {
        assert!(parse_labels::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for(Path::new("diagram.png")), "image/png");
        assert_eq!(content_type_for(Path::new("docs/report.PDF")), "application/pdf");
    }

    #[test]
    fn test_content_type_for_unknown_extension() {
        assert_eq!(
            content_type_for(Path::new("dump.zzunknown")),
            "application/octet-stream"
        );
        assert_eq!(content_type_for(Path::new("Makefile")), "application/octet-stream");
    }
}
