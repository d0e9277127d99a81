//! Creating spaces from the project space template.
//!
//! A new space gets its categories, a homepage built from [`homepage_body`],
//! and permissions granted per [`PermissionLevel`].

mod creator;
mod homepage;

pub use creator::{NewSpace, SpaceCreator, SpaceError, SpaceSummary};
pub use homepage::homepage_body;

/// Access level granted to a user or group on a new space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    /// View the space.
    Read,
    /// View, edit, comment, attach and blog.
    Write,
    /// Everything, including permission and export management.
    Admin,
}

impl PermissionLevel {
    /// Space permissions that make up this level.
    #[must_use]
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            Self::Read => &["VIEWSPACE"],
            Self::Write => &[
                "VIEWSPACE",
                "EDITSPACE",
                "COMMENT",
                "CREATEATTACHMENT",
                "EDITBLOG",
            ],
            Self::Admin => &[
                "VIEWSPACE",
                "SETSPACEPERMISSIONS",
                "EDITSPACE",
                "COMMENT",
                "REMOVECOMMENT",
                "CREATEATTACHMENT",
                "REMOVEATTACHMENT",
                "EDITBLOG",
                "REMOVEPAGE",
                "REMOVEBLOG",
                "EXPORTSPACE",
                "SETPAGEPERMISSIONS",
            ],
        }
    }
}
