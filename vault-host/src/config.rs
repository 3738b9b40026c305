//! Configuration file loading and management
//!
//! This module handles loading and parsing the host configuration from
//! `$XDG_CONFIG_HOME/vault-host/config.toml`. If the configuration file
//! doesn't exist, a default configuration is created with documented comments.

use anyhow::{Context, Result};
use provider_memory::EconomySettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub host: HostConfig,
    /// Seed data for the permission and chat backends
    #[serde(default)]
    pub permission: PermissionConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub log_level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PermissionConfig {
    /// Group reported as primary for players that joined none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group: Option<String>,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupConfig>,
}

/// A group created at startup, with its global nodes and chat metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupConfig {
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyConfig {
    pub currency_singular: String,
    pub currency_plural: String,
    /// Default: 2
    pub fractional_digits: u32,
    /// Balance for accounts created at runtime
    /// Default: 0.0
    pub starting_balance: f64,
    pub per_world_accounts: bool,
    /// Global accounts created at startup, by player identifier
    pub accounts: BTreeMap<String, f64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        let settings = EconomySettings::default();
        Self {
            currency_singular: settings.currency_singular,
            currency_plural: settings.currency_plural,
            fractional_digits: settings.fractional_digits,
            starting_balance: settings.starting_balance,
            per_world_accounts: settings.per_world_accounts,
            accounts: BTreeMap::new(),
        }
    }
}

impl EconomyConfig {
    pub fn settings(&self) -> EconomySettings {
        EconomySettings {
            currency_singular: self.currency_singular.clone(),
            currency_plural: self.currency_plural.clone(),
            fractional_digits: self.fractional_digits,
            starting_balance: self.starting_balance,
            per_world_accounts: self.per_world_accounts,
        }
    }
}

const MAX_FRACTIONAL_DIGITS: u32 = 6;

impl Config {
    /// Load configuration from the specified path
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// The parsed configuration or an error if loading/parsing fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Returns `$XDG_CONFIG_HOME/vault-host/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "vault", "vault-host")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    /// Generate the default configuration file content with comments
    pub fn default_config_content() -> String {
        r#"# Vault Host Configuration
# Seeds the in-memory permission, chat and economy backends.

[host]
# Log level: trace, debug, info, warn, error
# RUST_LOG overrides this when set.
# Default: "info"
log_level = "info"

[permission]
# Group reported as primary for players that joined no group
default_group = "default"

# Groups created at startup. Nodes are granted globally.
[permission.groups.default]
permissions = ["vault.chat"]

[permission.groups.admin]
permissions = ["vault.chat", "vault.admin"]
prefix = "[Admin] "

[economy]
currency_singular = "Dollar"
currency_plural = "Dollars"
# Digits after the decimal point (0-6)
fractional_digits = 2
# Balance for accounts created at runtime
starting_balance = 0.0
# When false, every player has a single account across worlds
per_world_accounts = false

# Accounts created at startup
[economy.accounts]
# Alice = 100.0
"#
        .to_string()
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are valid and within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.host.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.host.log_level,
                valid_log_levels.join(", ")
            );
        }

        if let Some(group) = &self.permission.default_group {
            if group.trim().is_empty() {
                anyhow::bail!("permission.default_group must not be empty");
            }
        }

        for (name, group) in &self.permission.groups {
            if name.trim().is_empty() {
                anyhow::bail!("Group names must not be empty");
            }
            if group.permissions.iter().any(|p| p.trim().is_empty()) {
                anyhow::bail!("Group '{}': permission nodes must not be empty", name);
            }
        }

        let economy = &self.economy;
        if economy.fractional_digits > MAX_FRACTIONAL_DIGITS {
            anyhow::bail!(
                "economy.fractional_digits must be at most {}",
                MAX_FRACTIONAL_DIGITS
            );
        }

        if !economy.starting_balance.is_finite() || economy.starting_balance < 0.0 {
            anyhow::bail!("economy.starting_balance must be a non-negative number");
        }

        for (player, balance) in &economy.accounts {
            if !balance.is_finite() || *balance < 0.0 {
                anyhow::bail!(
                    "Account '{}': balance must be a non-negative number",
                    player
                );
            }
        }

        Ok(())
    }
}
