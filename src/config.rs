use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::conflict::{Classifier, ClassifierConfig, Detector};
use crate::log::LogLevel;
use crate::registry::AliasRegistry;
use crate::store::JsonFileStore;
use crate::{dlog_debug, Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub thresholds: ClassifierConfig,
    pub store_path: Option<String>,
    #[serde(default)]
    pub allow_past_dates: bool,
    pub log_level: Option<String>,
    /// Per-call limit on store file I/O.
    pub io_timeout_secs: Option<u64>,
    /// Alias -> canonical client name.
    #[serde(default)]
    pub client_aliases: HashMap<String, String>,
}

impl Config {
    pub fn app_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".docketgate"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("docketgate.toml"))
    }

    pub fn default_store_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("schedule.json"))
    }

    pub fn effective_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(expand_tilde(path)),
            None => Self::default_store_path(),
        }
    }

    pub fn effective_log_level(&self) -> Result<Option<LogLevel>> {
        self.log_level
            .as_deref()
            .map(|level| level.parse::<LogLevel>().map_err(Error::Validation))
            .transpose()
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs.unwrap_or(5))
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if self.io_timeout_secs == Some(0) {
            return Err(Error::Validation("io_timeout_secs must be > 0".to_string()));
        }
        self.effective_log_level()?;
        Ok(())
    }

    pub fn detector(&self) -> Result<Detector> {
        Ok(Detector::new(Classifier::new(self.thresholds)?))
    }

    pub fn registry(&self) -> AliasRegistry {
        AliasRegistry::from_map(&self.client_aliases)
    }

    /// The file store at `store_override` if given, else the configured path.
    pub fn open_store(&self, store_override: Option<&Path>) -> Result<JsonFileStore> {
        let path = match store_override {
            Some(path) => path.to_path_buf(),
            None => self.effective_store_path()?,
        };
        Ok(JsonFileStore::new(path).with_io_timeout(self.io_timeout()))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        dlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            dlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        dlog_debug!(
            "Config loaded: thresholds={:?}, store_path={:?}, aliases={}",
            config.thresholds,
            config.store_path,
            config.client_aliases.len()
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                dlog_debug!("Creating config directory: {}", dir.display());
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        dlog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
