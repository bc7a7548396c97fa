use std::fmt;
use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

pub const LAST_SEARCH_KEY: &str = "movieExplorerLastSearch";
pub const THEME_MODE_KEY: &str = "appThemeMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Preferences {
    last_search: String,
    theme_mode: ThemeMode,
    storage: Arc<dyn KeyValueStore>,
}

impl Preferences {
    /// `prefers_dark` is the system preference, used when nothing is stored.
    pub fn load(storage: Arc<dyn KeyValueStore>, prefers_dark: bool) -> Self {
        let last_search = read_or_default(storage.as_ref(), LAST_SEARCH_KEY)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let system_mode = if prefers_dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        };
        let theme_mode = read_or_default(storage.as_ref(), THEME_MODE_KEY)
            .and_then(|s| ThemeMode::parse(&s))
            .unwrap_or(system_mode);
        Self {
            last_search,
            theme_mode,
            storage,
        }
    }

    pub fn last_search(&self) -> &str {
        &self.last_search
    }

    /// Remembers a trimmed search term. Blank input forgets the stored one.
    pub fn set_last_search(&mut self, query: &str) -> Result<(), StorageError> {
        let query = query.trim();
        if query.is_empty() {
            self.storage.remove(LAST_SEARCH_KEY)?;
        } else {
            self.storage.set(LAST_SEARCH_KEY, query)?;
        }
        self.last_search = query.to_string();
        Ok(())
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme_mode
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) -> Result<(), StorageError> {
        self.storage.set(THEME_MODE_KEY, mode.as_str())?;
        self.theme_mode = mode;
        Ok(())
    }

    pub fn toggle_theme_mode(&mut self) -> Result<ThemeMode, StorageError> {
        let next = self.theme_mode.toggled();
        self.set_theme_mode(next)?;
        Ok(next)
    }
}

fn read_or_default(storage: &dyn KeyValueStore, key: &str) -> Option<String> {
    storage.get(key).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "could not read preference");
        None
    })
}
