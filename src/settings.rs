use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub const API_KEY_ENV: &str = "TMDB_API_KEY";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    pub api_key: String,
    #[serde(default)]
    pub language: String,
    /// Override for proxies and test servers.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("movie-explorer")
                .join("config.json")
        })
    }

    pub fn data_dir() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".local/share/movie-explorer"))
    }

    /// Settings from the config file, with `TMDB_API_KEY` taking precedence
    /// over the stored key.
    pub fn load() -> Option<Self> {
        let from_file = Self::config_path().and_then(|path| Self::load_from(&path));
        Self::with_env_override(from_file, std::env::var(API_KEY_ENV).ok())
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
                None
            }
        }
    }

    fn with_env_override(settings: Option<Self>, env_key: Option<String>) -> Option<Self> {
        let env_key = env_key.filter(|k| !k.trim().is_empty());
        match (settings, env_key) {
            (Some(mut s), Some(key)) => {
                s.api_key = key.trim().to_string();
                Some(s)
            }
            (None, Some(key)) => Some(Self {
                api_key: key.trim().to_string(),
                ..Default::default()
            }),
            (settings, None) => settings,
        }
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "could not determine config path")
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn language(&self) -> &str {
        let language = self.language.trim();
        if language.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            language
        }
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }
}
