//! Configuration for the settlement CLI
//!
//! Only presentation and logging are configurable. The settlement tolerance
//! is a constant in `tripledger-core` and has no setting here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Settlement configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Amount display settings
    pub display: DisplayConfig,

    /// Report output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Amount display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places shown for amounts
    pub decimal_places: u32,

    /// Currency code appended to amounts
    pub currency: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            currency: None,
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text tables
    #[default]
    Text,
    /// JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(crate::Error::Config(format!("Unknown output format: {other}"))),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive (`RUST_LOG` takes precedence)
    pub filter: String,

    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_vars(var)?;
        Ok(config)
    }

    /// Override fields from `TRIPLEDGER_*` environment variables
    pub fn apply_env(&mut self) -> crate::Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> crate::Result<()> {
        if let Some(filter) = var("TRIPLEDGER_LOG") {
            self.logging.filter = filter;
        }

        if let Some(format) = var("TRIPLEDGER_FORMAT") {
            self.output.format = format.parse()?;
        }

        if let Some(currency) = var("TRIPLEDGER_CURRENCY") {
            let currency = currency.trim().to_uppercase();
            self.display.currency = if currency.is_empty() { None } else { Some(currency) };
        }

        self.validate()
    }

    /// Check value ranges
    pub fn validate(&self) -> crate::Result<()> {
        // Decimal supports at most 28 fractional digits
        if self.display.decimal_places > 28 {
            return Err(crate::Error::Config(format!(
                "decimal_places must be at most 28, got {}",
                self.display.decimal_places
            )));
        }

        if let Some(currency) = &self.display.currency {
            tripledger_core::validation::validate_currency(currency)?;
        }

        Ok(())
    }
}
