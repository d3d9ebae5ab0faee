// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalFileStore;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

fn default_inbox_tasks_path() -> String {
    "Inbox/Tasks.md".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Off => write!(f, "off"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LogLevel::iter()
            .find(|l| l.to_string() == s.to_lowercase())
            .ok_or_else(|| {
                let valid: Vec<String> = LogLevel::iter().map(|l| l.to_string()).collect();
                anyhow::anyhow!("Unknown log level '{}' (expected one of {})", s, valid.join(", "))
            })
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Root of the note vault. `None` uses the context's default vault.
    #[serde(default)]
    pub vault_root: Option<PathBuf>,
    /// Vault-relative path of the inbox task file.
    #[serde(default = "default_inbox_tasks_path")]
    pub inbox_tasks_path: String,
    #[serde(default)]
    pub show_completed: bool,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_root: None,
            // Match the serde defaults
            inbox_tasks_path: default_inbox_tasks_path(),
            show_completed: false,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.config_file()?;

        // Explicitly detect missing file so callers can fall back to defaults.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        // Walk the error chain and look for an underlying IO NotFound.
        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.config_file()?;
        LocalFileStore::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalFileStore::atomic_write(&path, toml_str)?;
            Ok(())
        })
    }

    /// Directory of the vault the task files live in.
    pub fn vault_dir(&self, ctx: &dyn AppContext) -> Result<PathBuf> {
        match &self.vault_root {
            Some(root) => Ok(root.clone()),
            None => {
                let dir = ctx.default_vault_dir()?;
                fs::create_dir_all(&dir)?;
                Ok(dir)
            }
        }
    }

    pub fn inbox_path(&self) -> PathBuf {
        PathBuf::from(&self.inbox_tasks_path)
    }
}
