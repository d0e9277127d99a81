//! Configuration management for spaceback.
//!
//! Parses `spaceback.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.username`
//! - `export.backup_dir`
//!
//! The password is deliberately not a configuration value; the CLI always
//! prompts for it.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server base URL.
    pub base_url: Option<String>,
    /// Override user name.
    pub username: Option<String>,
    /// Override the directory that holds `ConfluenceBackup_<KEY>` folders.
    pub backup_dir: Option<PathBuf>,
    /// Override page export toggle.
    pub pages: Option<bool>,
    /// Override blog export toggle.
    pub blog: Option<bool>,
    /// Override attachment download toggle.
    pub attachments: Option<bool>,
    /// Override git history toggle.
    pub history: Option<bool>,
    /// Override incremental blog post export.
    pub incremental_blogs: Option<bool>,
    /// Override worker count.
    pub threads: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "spaceback.toml";

/// Largest accepted worker count.
const MAX_THREADS: usize = 64;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence server configuration.
    pub confluence: Option<ConfluenceConfig>,
    /// Export configuration (paths are relative strings from TOML).
    export: ExportConfigRaw,
    /// Defaults for `space create`.
    pub space: SpaceConfig,

    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Confluence server configuration.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence server base URL, including any context path.
    pub base_url: String,
    /// User name (not the display name).
    pub username: String,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.username, "confluence.username")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Raw export configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    backup_dir: Option<String>,
    pages: Option<bool>,
    blog: Option<bool>,
    attachments: Option<bool>,
    history: Option<bool>,
    incremental_blogs: Option<bool>,
    threads: Option<usize>,
}

/// Resolved export configuration.
#[derive(Debug)]
pub struct ExportConfig {
    /// Directory holding one `ConfluenceBackup_<KEY>` folder per space.
    pub backup_dir: PathBuf,
    /// Export pages.
    pub pages: bool,
    /// Export blog posts.
    pub blog: bool,
    /// Download attachments.
    pub attachments: bool,
    /// Commit every run to a git history inside the output directory.
    pub history: bool,
    /// Apply the page skip rule to blog posts as well.
    pub incremental_blogs: bool,
    /// Number of workers used to export items.
    pub threads: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from("."),
            pages: true,
            blog: true,
            attachments: true,
            history: true,
            incremental_blogs: false,
            threads: 1,
        }
    }
}

impl ExportConfig {
    /// Output root for a space.
    #[must_use]
    pub fn output_root(&self, space_key: &str) -> PathBuf {
        self.backup_dir.join(format!("ConfluenceBackup_{space_key}"))
    }
}

/// Defaults applied by `space create`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Space categories (team labels) added to every new space.
    pub categories: Vec<String>,
    /// Groups granted read access.
    pub read_groups: Vec<String>,
    /// Groups granted write access.
    pub write_groups: Vec<String>,
    /// Groups or users granted administration.
    pub admins: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.username`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_USER`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `spaceback.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if settings.base_url.is_some() || settings.username.is_some() {
            let confluence = self.confluence.get_or_insert_with(|| ConfluenceConfig {
                base_url: String::new(),
                username: String::new(),
                timeout_secs: default_timeout_secs(),
            });
            if let Some(base_url) = &settings.base_url {
                confluence.base_url.clone_from(base_url);
            }
            if let Some(username) = &settings.username {
                confluence.username.clone_from(username);
            }
        }

        let export = &mut self.export_resolved;
        if let Some(backup_dir) = &settings.backup_dir {
            export.backup_dir.clone_from(backup_dir);
        }
        if let Some(pages) = settings.pages {
            export.pages = pages;
        }
        if let Some(blog) = settings.blog {
            export.blog = blog;
        }
        if let Some(attachments) = settings.attachments {
            export.attachments = attachments;
        }
        if let Some(history) = settings.history {
            export.history = history;
        }
        if let Some(incremental_blogs) = settings.incremental_blogs {
            export.incremental_blogs = incremental_blogs;
        }
        if let Some(threads) = settings.threads {
            export.threads = threads;
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Returns the Confluence config if the `[confluence]` section (or the
    /// equivalent CLI flags) is present and all fields are valid.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "[confluence] section or --server/--user flags required".into(),
            )
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            confluence: None,
            export: ExportConfigRaw::default(),
            space: SpaceConfig::default(),
            export_resolved: ExportConfig {
                backup_dir: base.to_path_buf(),
                ..ExportConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[confluence]` section is only checked by
    /// [`require_confluence`](Self::require_confluence), since not every
    /// command talks to the server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threads = self.export_resolved.threads;
        if threads == 0 {
            return Err(ConfigError::Validation(
                "export.threads must be greater than 0".to_owned(),
            ));
        }
        if threads > MAX_THREADS {
            return Err(ConfigError::Validation(format!(
                "export.threads cannot exceed {MAX_THREADS}"
            )));
        }
        if self
            .space
            .categories
            .iter()
            .any(|category| category.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "space.categories cannot contain empty labels".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.username = expand::expand_env(&confluence.username, "confluence.username")?;
        }

        if let Some(ref dir) = self.export.backup_dir {
            self.export.backup_dir = Some(expand::expand_env(dir, "export.backup_dir")?);
        }

        Ok(())
    }

    /// Resolve the raw export section against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = ExportConfig::default();
        let raw = &self.export;

        self.export_resolved = ExportConfig {
            backup_dir: config_dir.join(raw.backup_dir.as_deref().unwrap_or(".")),
            pages: raw.pages.unwrap_or(defaults.pages),
            blog: raw.blog.unwrap_or(defaults.blog),
            attachments: raw.attachments.unwrap_or(defaults.attachments),
            history: raw.history.unwrap_or(defaults.history),
            incremental_blogs: raw.incremental_blogs.unwrap_or(defaults.incremental_blogs),
            threads: raw.threads.unwrap_or(defaults.threads),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/work"));
        assert!(config.confluence.is_none());
        assert_eq!(config.export_resolved.backup_dir, PathBuf::from("/work"));
        assert!(config.export_resolved.pages);
        assert!(config.export_resolved.blog);
        assert!(config.export_resolved.attachments);
        assert!(config.export_resolved.history);
        assert!(!config.export_resolved.incremental_blogs);
        assert_eq!(config.export_resolved.threads, 1);
    }

    #[test]
    fn test_output_root_uses_space_key() {
        let config = Config::default_with_base(Path::new("/work"));
        assert_eq!(
            config.export_resolved.output_root("DOCS"),
            PathBuf::from("/work/ConfluenceBackup_DOCS")
        );
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.confluence.is_none());
        assert!(config.space.categories.is_empty());
    }

    #[test]
    fn test_parse_confluence_config() {
        let toml = r#"
[confluence]
base_url = "https://confluence.example.com"
username = "jdoe"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://confluence.example.com");
        assert_eq!(confluence.username, "jdoe");
        assert_eq!(confluence.timeout_secs, 30);
    }

    #[test]
    fn test_parse_space_config() {
        let toml = r#"
[space]
categories = ["team:docs", "team:calendar"]
read_groups = ["confluence-users"]
admins = ["wiki-admins"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.space.categories,
            vec!["team:docs".to_owned(), "team:calendar".to_owned()]
        );
        assert_eq!(config.space.read_groups, vec!["confluence-users".to_owned()]);
        assert!(config.space.write_groups.is_empty());
        assert_eq!(config.space.admins, vec!["wiki-admins".to_owned()]);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[export]
backup_dir = "backups"
blog = false
threads = 4
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.export_resolved.backup_dir,
            PathBuf::from("/project/backups")
        );
        assert!(config.export_resolved.pages);
        assert!(!config.export_resolved.blog);
        assert_eq!(config.export_resolved.threads, 4);
    }

    #[test]
    fn test_apply_cli_settings_creates_confluence_section() {
        let mut config = Config::default_with_base(Path::new("/work"));
        let overrides = CliSettings {
            base_url: Some("https://wiki.example.com/confluence".to_owned()),
            username: Some("jdoe".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        let confluence = config.require_confluence().unwrap();
        assert_eq!(confluence.base_url, "https://wiki.example.com/confluence");
        assert_eq!(confluence.username, "jdoe");
    }

    #[test]
    fn test_apply_cli_settings_keeps_file_values() {
        let toml = r#"
[confluence]
base_url = "https://confluence.example.com"
username = "from-file"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let overrides = CliSettings {
            username: Some("from-cli".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://confluence.example.com");
        assert_eq!(confluence.username, "from-cli");
    }

    #[test]
    fn test_apply_cli_settings_export_toggles() {
        let mut config = Config::default_with_base(Path::new("/work"));
        let overrides = CliSettings {
            pages: Some(false),
            attachments: Some(false),
            history: Some(false),
            incremental_blogs: Some(true),
            threads: Some(8),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        let export = &config.export_resolved;
        assert!(!export.pages);
        assert!(export.blog); // Unchanged
        assert!(!export.attachments);
        assert!(!export.history);
        assert!(export.incremental_blogs);
        assert_eq!(export.threads, 8);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/work"));

        config.apply_cli_settings(&CliSettings::default());

        assert!(config.confluence.is_none());
        assert_eq!(config.export_resolved.backup_dir, PathBuf::from("/work"));
    }

    #[test]
    fn test_expand_env_vars_confluence() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SPACEBACK_TEST_URL", "https://confluence.test.com");
            std::env::set_var("SPACEBACK_TEST_USER", "backup-bot");
        }

        let toml = r#"
[confluence]
base_url = "${SPACEBACK_TEST_URL}"
username = "${SPACEBACK_TEST_USER}"

[export]
backup_dir = "${SPACEBACK_TEST_BACKUPS:-archive}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/srv"));

        let confluence = config.confluence.as_ref().unwrap();
        assert_eq!(confluence.base_url, "https://confluence.test.com");
        assert_eq!(confluence.username, "backup-bot");
        assert_eq!(
            config.export_resolved.backup_dir,
            PathBuf::from("/srv/archive")
        );

        unsafe {
            std::env::remove_var("SPACEBACK_TEST_URL");
            std::env::remove_var("SPACEBACK_TEST_USER");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SPACEBACK_MISSING_URL");
        }

        let toml = r#"
[confluence]
base_url = "${SPACEBACK_MISSING_URL}"
username = "jdoe"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("SPACEBACK_MISSING_URL"));
        assert!(err.to_string().contains("confluence.base_url"));
    }

    // Validation tests

    fn assert_validation_error(result: Result<(), ConfigError>, expected_substrings: &[&str]) {
        let err = result.expect_err("Expected validation to fail");
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    fn valid_confluence_config() -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://confluence.example.com".to_owned(),
            username: "jdoe".to_owned(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/work"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_threads_zero() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.export_resolved.threads = 0;
        assert_validation_error(config.validate(), &["export.threads", "greater than 0"]);
    }

    #[test]
    fn test_validate_threads_too_high() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.export_resolved.threads = 500;
        assert_validation_error(config.validate(), &["export.threads", "64"]);
    }

    #[test]
    fn test_validate_blank_category() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.space.categories = vec!["team:docs".to_owned(), "  ".to_owned()];
        assert_validation_error(config.validate(), &["space.categories"]);
    }

    #[test]
    fn test_confluence_config_validate_valid() {
        assert!(valid_confluence_config().validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_empty_username() {
        let config = ConfluenceConfig {
            username: String::new(),
            ..valid_confluence_config()
        };
        assert_validation_error(config.validate(), &["username", "empty"]);
    }

    #[test]
    fn test_confluence_config_validate_invalid_url() {
        let config = ConfluenceConfig {
            base_url: "confluence.example.com".to_owned(),
            ..valid_confluence_config()
        };
        assert_validation_error(config.validate(), &["base_url", "http"]);
    }

    #[test]
    fn test_confluence_config_validate_zero_timeout() {
        let config = ConfluenceConfig {
            timeout_secs: 0,
            ..valid_confluence_config()
        };
        assert_validation_error(config.validate(), &["timeout_secs"]);
    }

    #[test]
    fn test_config_require_confluence_missing_section() {
        let config = Config::default_with_base(Path::new("/work"));
        let err = config.require_confluence().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[confluence]"));
    }

    #[test]
    fn test_config_require_confluence_invalid_config() {
        let mut config = Config::default_with_base(Path::new("/work"));
        config.confluence = Some(ConfluenceConfig {
            base_url: String::new(),
            ..valid_confluence_config()
        });
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }
}
