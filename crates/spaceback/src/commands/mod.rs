//! CLI command implementations.

mod blog;
mod export;
mod page;
mod space;

pub(crate) use blog::BlogCommand;
pub(crate) use export::ExportArgs;
pub(crate) use page::PageCommand;
pub(crate) use space::SpaceCommand;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use spaceback_config::{CliSettings, Config};
use spaceback_confluence::{ConfluenceClient, Credentials};
use tracing::debug;

use crate::error::CliError;
use crate::output::Output;

/// Server connection arguments shared by all commands.
#[derive(Args)]
pub(crate) struct ServerArgs {
    /// Confluence base URL, including any context path (overrides config).
    #[arg(short, long, env = "SPACEBACK_SERVER")]
    server: Option<String>,

    /// User name (overrides config).
    #[arg(short, long, env = "SPACEBACK_USER")]
    user: Option<String>,

    /// Path to configuration file (default: auto-discover spaceback.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ServerArgs {
    /// Load the configuration with these arguments applied on top.
    ///
    /// `settings` carries command-specific overrides; its server and user
    /// fields are replaced by the flags given here.
    pub(crate) fn load_config(&self, settings: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            base_url: self.server.clone(),
            username: self.user.clone(),
            ..settings
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }

    /// Load the configuration, prompt for the password and create a client.
    pub(crate) fn connect(&self, output: &Output) -> Result<ConfluenceClient, CliError> {
        let config = self.load_config(CliSettings::default())?;
        connect(&config, output)
    }
}

/// Prompt for the password and create a client for the configured server.
pub(crate) fn connect(config: &Config, output: &Output) -> Result<ConfluenceClient, CliError> {
    let conf = config.require_confluence().inspect_err(|_| {
        output.info("\nAdd the following to your spaceback.toml:");
        output.info("\n[confluence]");
        output.info(r#"base_url = "https://confluence.example.com""#);
        output.info(r#"username = "jdoe""#);
    })?;

    let password = output.prompt_password(&conf.username)?;
    if password.is_empty() {
        return Err(CliError::Validation("password cannot be empty".to_owned()));
    }
    debug!(
        "Connecting to {} as {} (config: {:?})",
        conf.base_url, conf.username, config.config_path
    );
    let credentials = Credentials::new(conf.username.clone(), password);
    Ok(ConfluenceClient::new(
        &conf.base_url,
        &credentials,
        Duration::from_secs(conf.timeout_secs),
    ))
}

/// Verify the credentials before making changes.
pub(crate) fn login(client: &ConfluenceClient, output: &Output) -> Result<(), CliError> {
    let user = client.current_user()?;
    output.info(&format!("Logged in as {}", user.name()));
    Ok(())
}

/// Read a body file in storage format.
pub(crate) fn read_body(path: &std::path::Path) -> Result<String, CliError> {
    let body = std::fs::read_to_string(path)?;
    if body.trim().is_empty() {
        return Err(CliError::Validation(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(body)
}
