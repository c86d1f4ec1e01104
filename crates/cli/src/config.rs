//! Configuration management for the CLI
//!
//! Settings are layered, later sources winning:
//! 1. built-in defaults
//! 2. an optional config file (`--config` or `IMPACT_CONFIG`)
//! 3. `IMPACT_*` environment variables
//! 4. command-line flags

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use impact_lib::parse_timestamp;
use serde::Deserialize;
use std::path::Path;

use crate::output::OutputFormat;

/// File and environment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Automation cutoff, ISO-8601
    #[serde(default)]
    pub cutoff: Option<String>,

    /// Reference time for current-month extrapolation, defaults to the clock
    #[serde(default)]
    pub now: Option<String>,

    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_format() -> String {
    "table".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            cutoff: None,
            now: None,
            format: default_format(),
            currency: default_currency(),
        }
    }
}

impl CliConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder
            .add_source(config::Environment::with_prefix("IMPACT"))
            .build()
            .with_context(|| match path {
                Some(path) => format!("Failed to load config file {}", path.display()),
                None => "Failed to load configuration from environment".to_string(),
            })?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Apply command-line overrides and validate
    pub fn resolve(self, overrides: Overrides) -> Result<Settings> {
        let format = match overrides.format {
            Some(format) => format,
            None => match OutputFormat::from_str(&self.format, true) {
                Ok(format) => format,
                Err(_) => bail!("Unknown output format {:?}, expected table or json", self.format),
            },
        };

        let cutoff = overrides
            .cutoff
            .or(self.cutoff)
            .map(|raw| parse_instant(&raw, "cutoff"))
            .transpose()?;

        let now = match overrides.now.or(self.now) {
            Some(raw) => parse_instant(&raw, "now")?,
            None => Utc::now(),
        };

        Ok(Settings {
            cutoff,
            now,
            format,
            currency: self.currency,
        })
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cutoff: Option<String>,
    pub now: Option<String>,
    pub format: Option<OutputFormat>,
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    pub cutoff: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
    pub format: OutputFormat,
    pub currency: String,
}

fn parse_instant(raw: &str, name: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).with_context(|| {
        format!("Invalid {name} {raw:?}: expected an ISO-8601 date or date-time")
    })
}
