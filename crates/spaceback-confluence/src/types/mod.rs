//! Confluence API types.
//!
//! Only fields that are actually used are declared; serde ignores the rest
//! of the (large) REST payloads.

mod attachment;
mod content;
mod label;
mod space;
mod user;

pub use attachment::{Attachment, AttachmentExtensions};
pub use content::{
    Body, Content, ContentKind, ContentMetadata, ContentRef, History, Links, Representation,
    ResultsPage, Version,
};
pub use label::Label;
pub use space::{Space, SpaceDescription};
pub use user::User;
