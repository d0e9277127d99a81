//! `spaceback space` subcommand group.

use clap::{Args, Subcommand};
use spaceback_config::{CliSettings, SpaceConfig};
use spaceback_confluence::space_template::SpaceSummary;
use spaceback_confluence::{NewSpace, SpaceCreator};

use super::{ServerArgs, connect, login};
use crate::error::CliError;
use crate::output::Output;

/// Space commands.
#[derive(Subcommand)]
pub(crate) enum SpaceCommand {
    /// Create a space from the project template.
    Create(CreateArgs),
}

impl SpaceCommand {
    /// Execute the space subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Create(args) => args.execute(),
        }
    }
}

/// Arguments for the space create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Space key (letters and digits).
    #[arg(short, long)]
    key: String,

    /// Space name.
    #[arg(short, long)]
    name: String,

    /// Space description.
    #[arg(short, long, default_value = "")]
    description: String,

    /// Space category, e.g. `team:docs` (repeatable, added to config defaults).
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Group granted read access (repeatable).
    #[arg(long = "read-group")]
    read_groups: Vec<String>,

    /// Group granted write access (repeatable).
    #[arg(long = "write-group")]
    write_groups: Vec<String>,

    /// User granted read access (repeatable).
    #[arg(long = "read-user")]
    read_users: Vec<String>,

    /// User granted write access (repeatable).
    #[arg(long = "write-user")]
    write_users: Vec<String>,

    /// User or group granted administration (repeatable).
    #[arg(long = "admin")]
    admins: Vec<String>,

    #[command(flatten)]
    server: ServerArgs,
}

impl CreateArgs {
    /// Execute the space create command.
    ///
    /// # Errors
    ///
    /// Returns an error if the space cannot be created.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.server.load_config(CliSettings::default())?;
        let space = self.new_space(&config.space);
        let client = connect(&config, &output)?;
        login(&client, &output)?;

        output.info(&format!("Creating space {} ({})...", space.key, space.name));
        let summary = SpaceCreator::new(&client).create(&space)?;
        print_summary(&output, &summary);
        Ok(())
    }

    /// Merge command-line grants and categories into the configured defaults.
    fn new_space(&self, defaults: &SpaceConfig) -> NewSpace {
        NewSpace {
            key: self.key.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            categories: merged(&[&defaults.categories, &self.categories]),
            readers: merged(&[&defaults.read_groups, &self.read_groups, &self.read_users]),
            writers: merged(&[&defaults.write_groups, &self.write_groups, &self.write_users]),
            admins: merged(&[&defaults.admins, &self.admins]),
        }
    }
}

/// Concatenate lists, dropping blanks and repeats.
fn merged(lists: &[&[String]]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in lists.iter().flat_map(|l| l.iter()) {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_owned());
        }
    }
    out
}

fn print_summary(output: &Output, summary: &SpaceSummary) {
    output.success("\nSpace created successfully!");
    output.info(&format!("Key: {}", summary.key));
    output.info(&format!("Name: {}", summary.name));
    output.info(&format!("Homepage: {}", summary.homepage_id));
    output.info(&format!("URL: {}", summary.url));
    output.info(&format!("Categories added: {}", summary.categories_added));
    output.info(&format!("Permissions granted: {}", summary.permissions_granted));
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: CreateArgs,
    }

    fn parse(args: &[&str]) -> CreateArgs {
        TestCli::parse_from(std::iter::once("create").chain(args.iter().copied())).args
    }

    #[test]
    fn test_new_space_merges_config_defaults() {
        let args = parse(&[
            "--key",
            "OPS",
            "--name",
            "Operations",
            "--category",
            "team:ops",
            "--read-group",
            "confluence-users",
            "--read-user",
            "auditor",
            "--write-user",
            "jdoe",
            "--admin",
            "ops-leads",
        ]);
        let defaults = SpaceConfig {
            categories: vec!["team:ops".to_owned(), "company".to_owned()],
            read_groups: vec!["confluence-users".to_owned()],
            write_groups: vec!["ops".to_owned()],
            admins: Vec::new(),
        };

        let space = args.new_space(&defaults);

        assert_eq!(space.key, "OPS");
        assert_eq!(space.description, "");
        assert_eq!(space.categories, vec!["team:ops", "company"]);
        assert_eq!(space.readers, vec!["confluence-users", "auditor"]);
        assert_eq!(space.writers, vec!["ops", "jdoe"]);
        assert_eq!(space.admins, vec!["ops-leads"]);
    }

    #[test]
    fn test_merged_drops_blanks() {
        let a = vec![" x ".to_owned(), String::new()];
        let b = vec!["x".to_owned(), "y".to_owned()];
        assert_eq!(merged(&[&a, &b]), vec!["x", "y"]);
    }
}
