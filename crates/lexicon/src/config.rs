//! File-based manager configuration.
//!
//! ```json
//! {
//!     "default_locale": "en",
//!     "initial_locale": "ro",
//!     "locales": ["en", "ro", "id"],
//!     "catalog_dir": "locales",
//!     "mode": "strict"
//! }
//! ```
//!
//! Each locale's catalog is read from `<catalog_dir>/<locale>.json`, or, when
//! `<catalog_dir>/<locale>/` is a directory, merged from the `*.json`
//! fragments inside it. A relative `catalog_dir` is resolved against the
//! directory of the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::interpreter::{LoadError, LocaleManager, TranslateMode};
use crate::types::LocaleId;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub default_locale: LocaleId,
    #[serde(default)]
    pub initial_locale: Option<LocaleId>,
    /// Locales to load besides the default locale.
    #[serde(default)]
    pub locales: Vec<LocaleId>,
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
    #[serde(default)]
    pub mode: TranslateMode,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("locales")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config file, resolving `catalog_dir` against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&content)?;
        if config.catalog_dir.is_relative() {
            let parent = path.parent().unwrap_or(Path::new(""));
            config.catalog_dir = parent.join(&config.catalog_dir);
        }
        Ok(config)
    }

    /// Every configured locale, default first, without duplicates. The
    /// initial locale counts as configured.
    pub fn all_locales(&self) -> Vec<LocaleId> {
        let mut locales = vec![self.default_locale.clone()];
        for locale in self.initial_locale.iter().chain(&self.locales) {
            if !locales.contains(locale) {
                locales.push(locale.clone());
            }
        }
        locales
    }

    pub fn catalog_path(&self, locale: &LocaleId) -> PathBuf {
        self.catalog_dir.join(format!("{locale}.json"))
    }

    /// Directory holding `locale`'s catalog fragments.
    pub fn fragment_dir(&self, locale: &LocaleId) -> PathBuf {
        self.catalog_dir.join(locale.as_str())
    }

    /// Load `locale`'s catalog into `manager`, from its fragment directory if
    /// there is one and from `<locale>.json` otherwise.
    pub fn load_locale(&self, manager: &LocaleManager, locale: LocaleId) -> Result<usize, LoadError> {
        let fragments = self.fragment_dir(&locale);
        if fragments.is_dir() {
            manager.load_catalog_dir(locale, fragments)
        } else {
            let path = self.catalog_path(&locale);
            manager.load_catalog_file(locale, path)
        }
    }
}

impl LocaleManager {
    /// Build a manager and load every configured catalog from disk.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let manager = LocaleManager::builder()
            .default_locale(config.default_locale.clone())
            .maybe_initial_locale(config.initial_locale.clone())
            .mode(config.mode)
            .build();
        for locale in config.all_locales() {
            config.load_locale(&manager, locale)?;
        }
        Ok(manager)
    }
}
