use crate::client::ClientParams;
use crate::utils::expand_tilde;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "GITWRITE_CONFIG_PATH";

/// Default configuration file path relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/gitwrite/config.toml";

/// Settings read from the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Transport and clone behavior
    #[serde(default)]
    pub git: GitConfig,

    /// Commit identity
    #[serde(default)]
    pub user: UserConfig,
}

/// The `[git]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitConfig {
    /// Private key for SSH transport; `~` is expanded
    #[serde(default)]
    pub private_ssh_key_path: Option<PathBuf>,
    /// Name prefix of temporary clone directories
    #[serde(default = "default_clone_prefix")]
    pub clone_prefix: String,
    #[serde(default)]
    pub branch: Option<String>,
    /// Create `branch` in empty repositories
    #[serde(default)]
    pub bootstrap: bool,
}

/// The `[user]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

fn default_clone_prefix() -> String {
    "gitwrite-".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            private_ssh_key_path: None,
            clone_prefix: default_clone_prefix(),
            branch: None,
            bootstrap: false,
        }
    }
}

impl Config {
    /// Location of the configuration file: `$GITWRITE_CONFIG_PATH`, else
    /// `~/.config/gitwrite/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from a file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML or invalid values
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.git.clone_prefix.is_empty() || self.git.clone_prefix.contains('/') {
            anyhow::bail!(
                "git.clone_prefix must be a non-empty file name prefix, got '{}'",
                self.git.clone_prefix
            );
        }
        if let Some(email) = &self.user.email
            && !email.contains('@')
        {
            anyhow::bail!("Invalid email address: {email}");
        }
        Ok(())
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Client construction parameters derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `~` in the key path cannot be expanded
    pub fn client_params(&self) -> Result<ClientParams> {
        let private_ssh_key_path = self
            .git
            .private_ssh_key_path
            .as_deref()
            .map(expand_tilde)
            .transpose()?;
        Ok(ClientParams {
            private_ssh_key_path,
        })
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key.split_once('.')? {
            ("user", "name") => self.user.name.clone(),
            ("user", "email") => self.user.email.clone(),
            ("git", "private_ssh_key_path") => self
                .git
                .private_ssh_key_path
                .as_ref()
                .map(|p| p.display().to_string()),
            ("git", "clone_prefix") => Some(self.git.clone_prefix.clone()),
            ("git", "branch") => self.git.branch.clone(),
            ("git", "bootstrap") => Some(self.git.bootstrap.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let (section, name) = key
            .split_once('.')
            .with_context(|| format!("Invalid configuration key: {key}"))?;

        match (section, name) {
            ("user", "name") => self.user.name = Some(value),
            ("user", "email") => {
                if !value.contains('@') {
                    return Err(anyhow::anyhow!("Invalid email address: {value}"));
                }
                self.user.email = Some(value);
            }
            ("git", "private_ssh_key_path") => self.git.private_ssh_key_path = Some(value.into()),
            ("git", "clone_prefix") => {
                if value.is_empty() || value.contains('/') {
                    return Err(anyhow::anyhow!("Invalid clone prefix: '{value}'"));
                }
                self.git.clone_prefix = value;
            }
            ("git", "branch") => self.git.branch = Some(value),
            ("git", "bootstrap") => {
                self.git.bootstrap = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }
}
