//! Confluence integration for spaceback.
//!
//! This crate provides:
//! - [`ConfluenceClient`]: REST API client with HTTP basic authentication,
//!   plus the few JSON-RPC calls needed for space categories and permissions
//! - [`ContentPublisher`]: create, update and read pages and blog posts
//! - [`SpaceCreator`]: create spaces from the project space template
//!
//! # API Client
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use spaceback_confluence::{ConfluenceClient, ContentKind, Credentials};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &Credentials::new("jdoe", "secret"),
//!     Duration::from_secs(30),
//! );
//!
//! client.current_user()?;
//! for page in client.list_content("OPS", ContentKind::Page, &[])? {
//!     println!("{} {}", page.id, page.title);
//! }
//! # Ok(())
//! # }
//! ```

// API client
mod client;
pub use client::{ConfluenceClient, ContentUpdate, Credentials, NewContent, encode_path_segment};

// Types
pub mod types;
pub use types::ContentKind;

// Content publisher
pub mod publisher;
pub use publisher::{ContentChange, ContentDraft, ContentPublisher, ParentPage};

// Space template
pub mod space_template;
pub use space_template::{NewSpace, SpaceCreator};

// Errors
pub mod error;
pub use error::ConfluenceError;
