//! CLI error types.

use spaceback_config::ConfigError;
use spaceback_confluence::ConfluenceError;
use spaceback_confluence::publisher::PublishError;
use spaceback_confluence::space_template::SpaceError;
use spaceback_export::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Space(#[from] SpaceError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0} item(s) could not be exported")]
    IncompleteExport(usize),

    #[error("{0}")]
    Validation(String),
}
