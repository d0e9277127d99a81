//! `spaceback blog` subcommand group.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use spaceback_confluence::publisher::parse_labels;
use spaceback_confluence::{ContentDraft, ContentKind, ContentPublisher, ParentPage};

use super::page::print_publish_result;
use super::{ServerArgs, login, read_body};
use crate::error::CliError;
use crate::output::Output;

/// Blog post commands.
#[derive(Subcommand)]
pub(crate) enum BlogCommand {
    /// Create a blog post.
    Create(CreateArgs),
}

impl BlogCommand {
    /// Execute the blog subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Create(args) => args.execute(),
        }
    }
}

/// Arguments for the blog create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// File with the post body in storage format.
    body_file: PathBuf,

    /// Key of the target space.
    #[arg(long)]
    space: String,

    /// Post title.
    #[arg(short, long)]
    title: String,

    /// Label to add; comma-separated lists are accepted (repeatable).
    #[arg(short, long = "label")]
    labels: Vec<String>,

    /// File to attach (repeatable).
    #[arg(short, long = "attach")]
    attachments: Vec<PathBuf>,

    #[command(flatten)]
    server: ServerArgs,
}

impl CreateArgs {
    /// Execute the blog create command.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be read or publishing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let body = read_body(&self.body_file)?;

        let client = self.server.connect(&output)?;
        login(&client, &output)?;

        let draft = ContentDraft {
            kind: ContentKind::BlogPost,
            space_key: self.space,
            title: self.title,
            body,
            parent: ParentPage::None,
            labels: parse_labels(&self.labels),
            attachments: self.attachments,
        };
        let result = ContentPublisher::new(&client).publish(&draft)?;
        print_publish_result(&output, "Blog post created successfully!", &result);
        Ok(())
    }
}
