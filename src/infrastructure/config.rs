use crate::constants::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_RETRY_BACKOFF_MS};
use crate::domain::{ParserRules, Settings, TagSource};
use crate::infrastructure::fetcher::FetchPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// TOML configuration for conversions
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_options")]
    pub options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// A card option as written in the file: a flag or a string such as a block id
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(b) => write!(f, "{}", b),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RulesConfig {
    #[serde(default = "default_flashcard_is")]
    pub flashcard_is: Vec<String>,
    #[serde(default = "default_sub_deck_is")]
    pub sub_deck_is: Vec<String>,
    #[serde(default = "default_tags_is")]
    pub tags_is: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

// Default value functions
fn default_flashcard_is() -> Vec<String> { vec!["toggle".to_string()] }
fn default_sub_deck_is() -> Vec<String> { vec!["child_page".to_string()] }
fn default_tags_is() -> String { "strikethrough".to_string() }
fn default_timeout_ms() -> u64 { DEFAULT_FETCH_TIMEOUT_MS }
fn default_retry_backoff_ms() -> u64 { DEFAULT_RETRY_BACKOFF_MS }

/// Every card option at its default value
fn default_options() -> BTreeMap<String, OptionValue> {
    let defaults = Settings::default();
    crate::domain::settings::OPTION_KEYS
        .iter()
        .filter_map(|key| {
            defaults
                .flag(key)
                .map(|value| (key.to_string(), OptionValue::Flag(value)))
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: default_options(),
            rules: RulesConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            flashcard_is: default_flashcard_is(),
            sub_deck_is: default_sub_deck_is(),
            tags_is: default_tags_is(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Card settings from the file options, with `overrides` taking precedence
    pub fn settings(&self, overrides: &[(String, String)]) -> Result<Settings> {
        let mut merged: BTreeMap<String, String> = self
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        merged.extend(overrides.iter().cloned());

        Settings::from_options(merged).context("Invalid card options")
    }

    pub fn rules(&self) -> Result<ParserRules> {
        let tags_from: TagSource = self.rules.tags_is.parse().context("Invalid rules.tags_is")?;
        let rules = ParserRules::new()
            .with_flashcard_types(&self.rules.flashcard_is.join(","))
            .context("Invalid rules.flashcard_is")?
            .with_sub_deck_types(&self.rules.sub_deck_is.join(","))
            .context("Invalid rules.sub_deck_is")?
            .with_tags_from(tags_from);
        Ok(rules)
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_millis(self.fetch.timeout_ms),
            retry_backoff: Duration::from_millis(self.fetch.retry_backoff_ms),
        }
    }
}
