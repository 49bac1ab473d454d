use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::core::Result;
use crate::permission::Account;

pub const ENV_PREFIX: &str = "HARNESS_ADMIN";

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support/harness-admin"))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join("harness-admin"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join("harness-admin"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config/harness-admin"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub owner: Option<Account>,
    pub state_path: Option<PathBuf>,
    pub journal_path: Option<PathBuf>,
}

impl AppConfig {
    /// Loads `path` (if it exists) overlaid with `HARNESS_ADMIN_*` environment
    /// variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    #[must_use]
    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_path
            .clone()
            .or_else(|| get_config_dir().map(|dir| dir.join("state.json")))
    }

    #[must_use]
    pub fn journal_path(&self) -> Option<PathBuf> {
        self.journal_path
            .clone()
            .or_else(|| get_config_dir().map(|dir| dir.join("audit.jsonl")))
    }

    pub fn init_at(path: &Path) -> std::result::Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }

        fs::write(path, include_str!("config.template.toml"))
    }

    pub fn render(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::core::AppError::Config(format!("Failed to render config: {e}")))
    }
}
