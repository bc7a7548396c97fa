use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::media::{MovieId, MovieSummary};
use crate::session::Identity;
use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "movieExplorerFavorites";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub backdrop_path: Option<String>,
}

impl From<&MovieSummary> for FavoriteEntry {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            vote_average: movie.vote_average,
            release_date: movie.release_date.clone(),
            overview: movie.overview.clone(),
            backdrop_path: movie.backdrop_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    LoginRequired,
}

pub struct FavoritesStore {
    entries: Vec<FavoriteEntry>,
    storage: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    /// Reads the stored list. Missing or unreadable data starts an empty list.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let entries = match storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding malformed favorites list");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read favorites, starting empty");
                Vec::new()
            }
        };
        Self { entries, storage }
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Adds or removes `movie` and writes the full list before returning.
    /// On a failed write the in-memory list is left as it was.
    pub fn toggle(&mut self, movie: &MovieSummary) -> Result<ToggleOutcome, StorageError> {
        let was_favorite = self.is_favorite(movie.id);
        let mut next: Vec<FavoriteEntry> = self
            .entries
            .iter()
            .filter(|e| e.id != movie.id)
            .cloned()
            .collect();
        if !was_favorite {
            next.push(FavoriteEntry::from(movie));
        }

        self.persist(&next)?;
        self.entries = next;

        let outcome = if was_favorite {
            ToggleOutcome::Removed
        } else {
            ToggleOutcome::Added
        };
        tracing::debug!(movie_id = movie.id, ?outcome, "favorites updated");
        Ok(outcome)
    }

    pub fn toggle_as(
        &mut self,
        identity: &dyn Identity,
        movie: &MovieSummary,
    ) -> Result<ToggleOutcome, StorageError> {
        if !identity.is_signed_in() {
            return Ok(ToggleOutcome::LoginRequired);
        }
        self.toggle(movie)
    }

    fn persist(&self, entries: &[FavoriteEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.storage.set(FAVORITES_KEY, &json)
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}
