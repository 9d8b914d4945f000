//! # Configuration State
//!
//! Console configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`DEPOT_*`)
//! 2. Config file (`console.toml` in the platform config directory, or
//!    `--config <path>`)
//! 3. Defaults (this file)
//!
//! ## Example File
//! ```toml
//! [backend]
//! url = "https://xyz.supabase.co"
//! anon_key = "eyJhbGciOi..."
//! timeout_secs = 15
//!
//! [report]
//! utc_offset = "-03:00"
//! export_dir = "/home/depot/relatorios"
//!
//! [display]
//! currency_symbol = "R$ "
//! currency_decimals = 2
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after loading, so no mutex is needed.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use depot_core::{Money, ReportZone};
use depot_store::{BackendConfig, StoreResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE: &str = "console.toml";

/// Console configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub backend: BackendSection,
    pub report: ReportSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Public (anon) API key
    pub anon_key: String,

    /// Per-request timeout.
    /// Default: 30
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        BackendSection {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// `local`, `utc`, or an offset such as `-03:00`. Unset means local.
    pub utc_offset: Option<String>,

    /// Where exports are saved. Unset means the working directory.
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,
}

impl Default for DisplaySection {
    fn default() -> Self {
        DisplaySection {
            currency_symbol: "R$ ".to_string(),
            currency_decimals: 2,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl ConsoleConfig {
    /// Platform directories for the console.
    ///
    /// - Linux: `~/.config/console` and `~/.local/share/console`
    /// - macOS: `~/Library/Application Support/com.depot.console`
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "depot", "console")
    }

    /// `<config_dir>/console.toml`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Loads defaults, then the file, then the environment, then validates.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file, using defaults");
                    ConsoleConfig::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        info!(
            backend = %config.backend.url,
            zone = %config.zone(),
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "Config file read");
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `DEPOT_*` overrides.
    ///
    /// ## Environment Variables
    /// - `DEPOT_BACKEND_URL`: backend project URL
    /// - `DEPOT_ANON_KEY`: public API key
    /// - `DEPOT_UTC_OFFSET`: report calendar (`local`, `utc`, `-03:00`)
    /// - `DEPOT_EXPORT_DIR`: export directory
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DEPOT_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(key) = lookup("DEPOT_ANON_KEY") {
            self.backend.anon_key = key;
        }
        if let Some(offset) = lookup("DEPOT_UTC_OFFSET") {
            self.report.utc_offset = Some(offset);
        }
        if let Some(dir) = lookup("DEPOT_EXPORT_DIR") {
            self.report.export_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingRequired(
                "backend.url (or DEPOT_BACKEND_URL)".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "backend.url".to_string(),
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "backend.anon_key (or DEPOT_ANON_KEY)".to_string(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backend.timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(offset) = &self.report.utc_offset {
            if ReportZone::parse(offset).is_none() {
                return Err(ConfigError::InvalidValue {
                    key: "report.utc_offset".to_string(),
                    reason: format!("'{offset}' is not local, utc or ±HH:MM"),
                });
            }
        }
        if self.display.currency_decimals > 4 {
            return Err(ConfigError::InvalidValue {
                key: "display.currency_decimals".to_string(),
                reason: "must be between 0 and 4".to_string(),
            });
        }
        Ok(())
    }

    /// The report calendar. Falls back to local time for an unparseable
    /// offset, which [`validate`](Self::validate) already rejects.
    pub fn zone(&self) -> ReportZone {
        self.report
            .utc_offset
            .as_deref()
            .and_then(ReportZone::parse)
            .unwrap_or_default()
    }

    pub fn backend_config(&self) -> StoreResult<BackendConfig> {
        Ok(BackendConfig::new(&self.backend.url, self.backend.anon_key.clone())?
            .timeout(Duration::from_secs(self.backend.timeout_secs)))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.report
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConsoleConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "R$ 12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let decimals = u32::from(self.display.currency_decimals);
        // Money is always in cents; rescale to the display precision
        let scaled = match decimals {
            0 => cents / 100,
            1 => cents / 10,
            2 => cents,
            d => cents * 10_i64.pow(d - 2),
        };
        let divisor = 10_i64.pow(decimals);
        let whole = scaled / divisor;
        let frac = (scaled % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.display.currency_symbol,
            if decimals > 0 {
                format!("{}.{:0width$}", whole.abs(), frac, width = decimals as usize)
            } else {
                whole.abs().to_string()
            }
        )
    }
}
