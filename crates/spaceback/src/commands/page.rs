//! `spaceback page` subcommand group.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use spaceback_confluence::publisher::{ContentSnapshot, PublishResult, parse_labels};
use spaceback_confluence::{ContentChange, ContentDraft, ContentKind, ContentPublisher, ParentPage};

use super::{ServerArgs, login, read_body};
use crate::error::CliError;
use crate::output::Output;

/// Page commands.
#[derive(Subcommand)]
pub(crate) enum PageCommand {
    /// Create a page.
    Create(CreateArgs),
    /// Update an existing page or blog post.
    Update(UpdateArgs),
    /// Show a page or blog post.
    Get(GetArgs),
}

impl PageCommand {
    /// Execute the page subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Create(args) => args.execute(),
            Self::Update(args) => args.execute(),
            Self::Get(args) => args.execute(),
        }
    }
}

/// Arguments for the page create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// File with the page body in storage format.
    body_file: PathBuf,

    /// Key of the target space.
    #[arg(long)]
    space: String,

    /// Page title.
    #[arg(short, long)]
    title: String,

    /// ID of the parent page.
    #[arg(short, long, conflicts_with = "under_home")]
    parent: Option<String>,

    /// Place the page under the space homepage.
    #[arg(long)]
    under_home: bool,

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
    /// Execute the page create command.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be read or publishing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let body = read_body(&self.body_file)?;

        let client = self.server.connect(&output)?;
        login(&client, &output)?;

        let parent = match (self.parent, self.under_home) {
            (Some(id), _) => ParentPage::Page(id),
            (None, true) => ParentPage::SpaceHome,
            (None, false) => ParentPage::None,
        };
        let draft = ContentDraft {
            kind: ContentKind::Page,
            space_key: self.space,
            title: self.title,
            body,
            parent,
            labels: parse_labels(&self.labels),
            attachments: self.attachments,
        };
        let result = ContentPublisher::new(&client).publish(&draft)?;
        print_publish_result(&output, "Page created successfully!", &result);
        Ok(())
    }
}

/// Arguments for the page update command.
#[derive(Args)]
pub(crate) struct UpdateArgs {
    /// Content ID of the page or blog post.
    id: String,

    /// New title.
    #[arg(short, long)]
    title: Option<String>,

    /// File with the new body in storage format.
    #[arg(short, long)]
    body_file: Option<PathBuf>,

    /// Version message.
    #[arg(short, long)]
    message: Option<String>,

    /// Label to add; comma-separated lists are accepted (repeatable).
    #[arg(short, long = "label")]
    labels: Vec<String>,

    /// File to attach (repeatable).
    #[arg(short, long = "attach")]
    attachments: Vec<PathBuf>,

    #[command(flatten)]
    server: ServerArgs,
}

impl UpdateArgs {
    /// Execute the page update command.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing would change or the update fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let change = self.change()?;
        if change.title.is_none()
            && change.body.is_none()
            && change.labels.is_empty()
            && change.attachments.is_empty()
        {
            return Err(CliError::Validation(
                "nothing to update: give --title, --body-file, --label or --attach".to_owned(),
            ));
        }

        let client = self.server.connect(&output)?;
        login(&client, &output)?;

        let result = ContentPublisher::new(&client).update(&self.id, &change)?;
        print_publish_result(&output, "Content updated successfully!", &result);
        Ok(())
    }

    fn change(&self) -> Result<ContentChange, CliError> {
        let body = self.body_file.as_deref().map(read_body).transpose()?;
        Ok(ContentChange {
            title: self.title.clone(),
            body,
            message: self.message.clone(),
            labels: parse_labels(&self.labels),
            attachments: self.attachments.clone(),
        })
    }
}

/// Arguments for the page get command.
#[derive(Args)]
pub(crate) struct GetArgs {
    /// Content ID of the page or blog post.
    id: String,

    /// Write the storage-format body to stdout.
    #[arg(long)]
    body: bool,

    #[command(flatten)]
    server: ServerArgs,
}

impl GetArgs {
    /// Execute the page get command.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let client = self.server.connect(&output)?;

        let snapshot = ContentPublisher::new(&client).read(&self.id)?;
        print_snapshot(&output, &snapshot);
        if self.body {
            output.data(&snapshot.body);
        }
        Ok(())
    }
}

pub(super) fn print_publish_result(output: &Output, headline: &str, result: &PublishResult) {
    output.success(&format!("\n{headline}"));
    output.info(&format!("ID: {}", result.id));
    output.info(&format!("Title: {}", result.title));
    output.info(&format!("Type: {}", result.kind));
    output.info(&format!("Version: {}", result.version));
    output.info(&format!("URL: {}", result.url));
    if result.labels_added > 0 {
        output.info(&format!("Labels added: {}", result.labels_added));
    }
    if result.attachments_uploaded > 0 {
        output.info(&format!(
            "Attachments uploaded: {}",
            result.attachments_uploaded
        ));
    }
}

fn print_snapshot(output: &Output, snapshot: &ContentSnapshot) {
    output.highlight(&snapshot.title);
    output.info(&format!("ID: {}", snapshot.id));
    output.info(&format!("Type: {}", snapshot.kind));
    if let Some(space) = &snapshot.space_key {
        output.info(&format!("Space: {space}"));
    }
    output.info(&format!("Version: {}", snapshot.version));
    if !snapshot.labels.is_empty() {
        output.info(&format!("Labels: {}", snapshot.labels.join(", ")));
    }
    output.info(&format!("URL: {}", snapshot.url));
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: PageCommand,
    }

    fn parse(args: &[&str]) -> Result<PageCommand, clap::Error> {
        TestCli::try_parse_from(std::iter::once("page").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_parent_conflicts_with_under_home() {
        let result = parse(&[
            "create", "body.xml", "--space", "OPS", "--title", "T", "--parent", "1", "--under-home",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_collects_labels() {
        let Ok(PageCommand::Update(args)) = parse(&[
            "update", "42", "-l", "ops,release", "--label", "howto", "-m", "typo",
        ]) else {
            panic!("expected update command");
        };
        let change = args.change().unwrap();
        assert_eq!(change.labels, vec!["ops", "release", "howto"]);
        assert_eq!(change.message.as_deref(), Some("typo"));
        assert_eq!(change.title, None);
        assert_eq!(change.body, None);
    }

    #[test]
    fn test_update_reads_body_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("body.xml");
        std::fs::write(&path, "<p>new</p>").unwrap();

        let Ok(PageCommand::Update(args)) =
            parse(&["update", "42", "--body-file", path.to_str().unwrap()])
        else {
            panic!("expected update command");
        };
        assert_eq!(args.change().unwrap().body.as_deref(), Some("<p>new</p>"));
    }

    #[test]
    fn test_update_rejects_empty_body_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.xml");
        std::fs::write(&path, "  \n").unwrap();

        let Ok(PageCommand::Update(args)) =
            parse(&["update", "42", "-b", path.to_str().unwrap()])
        else {
            panic!("expected update command");
        };
        assert!(matches!(args.change(), Err(CliError::Validation(_))));
    }
}
