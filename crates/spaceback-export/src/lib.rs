//! Incremental static HTML export of Confluence spaces.
//!
//! An archive is a self-contained directory:
//!
//! ```text
//! ConfluenceBackup_OPS/
//! ├── assets/{main.css, main.js, blogtree.html}
//! ├── pages/{id}.html
//! ├── blogs/{id}.html
//! ├── attachments/{content id}/{file name}
//! ├── start-here.html
//! └── backuptime.txt
//! ```
//!
//! Every page carries the full page tree in its sidebar; blog posts embed
//! `assets/blogtree.html`. Re-running an export only rewrites items changed
//! since the time recorded in `backuptime.txt`.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use spaceback_confluence::{ConfluenceClient, Credentials};
//! use spaceback_export::{ExportEngine, ExportOptions, NoProgress};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &Credentials::new("jdoe", "secret"),
//!     Duration::from_secs(30),
//! );
//! let options = ExportOptions::new("OPS", "ConfluenceBackup_OPS");
//! let report = ExportEngine::new(&client, options).run(&NoProgress)?;
//! assert!(report.is_complete());
//! # Ok(())
//! # }
//! ```

mod blog_index;
mod engine;
mod error;
mod finalize;
pub mod html;
mod links;
mod manifest;
mod model;
mod page_tree;
mod source;

pub use blog_index::{BlogEntry, BlogIndex, MonthGroup};
pub use engine::{
    ExportEngine, ExportOptions, ExportReport, ItemFailure, ItemOutcome, NoProgress, Progress,
};
pub use error::{ExportError, SourceError};
pub use finalize::START_PAGE_FILE;
pub use links::LinkRewriter;
pub use manifest::{MANIFEST_FILE, Manifest};
pub use model::{AttachmentRef, Comment, ContentItem, ContentKind, Space, Timestamp};
pub use page_tree::PageTree;
pub use source::ContentSource;
