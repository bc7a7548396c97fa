use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::details::DetailsView;
use crate::discover::DiscoverySession;
use crate::error::{ApiError, StorageError};
use crate::favorites::{FavoriteEntry, FavoritesStore, ToggleOutcome};
use crate::media::{GenreCatalog, MovieId, MovieSummary, Paged, Shelf, ShelfState, TrendingWindow};
use crate::preferences::{Preferences, ThemeMode};
use crate::search::SearchSession;
use crate::session::Identity;
use crate::storage::KeyValueStore;
use crate::tmdb::TmdbClient;

pub const ESSENTIAL_DATA_ERROR: &str = "Could not load essential app data.";
pub const PARTIAL_SHELVES_ERROR: &str = "Some movie sections could not be loaded.";

#[derive(Debug, Clone, Default)]
pub struct MovieDataSnapshot {
    pub shelves: HashMap<Shelf, ShelfState>,
    /// Page-level advisory, separate from the per-shelf errors.
    pub initial_data_error: Option<String>,
    pub genres: GenreCatalog,
    pub search: SearchSession,
    pub discovery: DiscoverySession,
    pub details: DetailsView,
}

impl MovieDataSnapshot {
    pub fn shelf(&self, shelf: Shelf) -> ShelfState {
        self.shelves.get(&shelf).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub(crate) struct StoreState {
    pub(crate) data: MovieDataSnapshot,
    bootstrapped: bool,
    pub(crate) search_seq: u64,
    pub(crate) discovery_seq: u64,
    pub(crate) details_seq: u64,
}

/// Single source of truth for the home shelves, search, discovery, the
/// details view, favorites and preferences.
///
/// Every method takes `&self`; state sits behind a mutex that is never held
/// across an await. Subscribers are woken through a revision counter after
/// each change.
pub struct MovieDataStore {
    pub(crate) client: TmdbClient,
    state: Mutex<StoreState>,
    favorites: Mutex<FavoritesStore>,
    preferences: Mutex<Preferences>,
    revision: watch::Sender<u64>,
}

impl MovieDataStore {
    pub fn new(client: TmdbClient, storage: Arc<dyn KeyValueStore>, prefers_dark: bool) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            client,
            state: Mutex::new(StoreState::default()),
            favorites: Mutex::new(FavoritesStore::load(storage.clone())),
            preferences: Mutex::new(Preferences::load(storage, prefers_dark)),
            revision,
        }
    }

    pub fn client(&self) -> &TmdbClient {
        &self.client
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn snapshot(&self) -> MovieDataSnapshot {
        self.lock_state().data.clone()
    }

    pub fn shelf(&self, shelf: Shelf) -> ShelfState {
        self.lock_state().data.shelf(shelf)
    }

    pub fn initial_data_error(&self) -> Option<String> {
        self.lock_state().data.initial_data_error.clone()
    }

    pub fn genres(&self) -> GenreCatalog {
        self.lock_state().data.genres.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.lock_state())
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let result = f(&mut self.lock_state());
        self.notify();
        result
    }

    fn notify(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Loads config, genres and the five home shelves. Runs once per store;
    /// later calls return immediately.
    pub async fn bootstrap(&self) {
        let first_run = self.update(|state| {
            if state.bootstrapped {
                return false;
            }
            state.bootstrapped = true;
            for shelf in Shelf::ALL {
                state.data.shelves.insert(
                    shelf,
                    ShelfState {
                        loading: true,
                        ..Default::default()
                    },
                );
            }
            true
        });
        if !first_run {
            return;
        }

        let genres = match self.client.ensure_loaded().await {
            Ok(genres) => genres,
            Err(e) => {
                tracing::error!(error = %e, "critical error fetching initial app data");
                self.update(|state| {
                    state.data.initial_data_error = Some(String::from(ESSENTIAL_DATA_ERROR));
                    for slot in state.data.shelves.values_mut() {
                        slot.loading = false;
                    }
                });
                return;
            }
        };
        self.update(|state| state.data.genres = genres);

        let settled = tokio::join!(
            self.load_shelf(Shelf::Featured),
            self.load_shelf(Shelf::Trending),
            self.load_shelf(Shelf::Popular),
            self.load_shelf(Shelf::TopRated),
            self.load_shelf(Shelf::NewReleases),
        );
        let outcomes = [settled.0, settled.1, settled.2, settled.3, settled.4];
        let failed = outcomes.iter().filter(|ok| !**ok).count();
        if failed > 0 {
            tracing::warn!(failed, "home page loaded with missing shelves");
            self.update(|state| {
                state.data.initial_data_error = Some(String::from(PARTIAL_SHELVES_ERROR));
            });
        } else {
            tracing::info!("home page shelves loaded");
        }
    }

    async fn fetch_shelf(&self, shelf: Shelf) -> Result<Paged<MovieSummary>, ApiError> {
        match shelf {
            Shelf::Featured | Shelf::TopRated => self.client.fetch_top_rated(1).await,
            Shelf::Trending => self.client.fetch_trending(TrendingWindow::Day, 1).await,
            Shelf::Popular => self.client.fetch_popular(1).await,
            Shelf::NewReleases => self.client.fetch_upcoming(1).await,
        }
    }

    async fn load_shelf(&self, shelf: Shelf) -> bool {
        let result = self.fetch_shelf(shelf).await;
        let loaded = result.is_ok();
        self.update(|state| {
            let slot = state.data.shelves.entry(shelf).or_default();
            match result {
                Ok(page) => {
                    slot.movies = shelf.arrange(page.results);
                    slot.error = None;
                }
                Err(e) => {
                    tracing::error!(shelf = shelf.title(), error = %e, "failed to fetch shelf");
                    slot.error = Some(format!("Could not load {}.", shelf.title()));
                }
            }
            slot.loading = false;
        });
        loaded
    }

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.lock_favorites().entries().to_vec()
    }

    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.lock_favorites().is_favorite(id)
    }

    /// Favoriting is only open to signed-in users; anonymous users get
    /// [`ToggleOutcome::LoginRequired`] and nothing changes.
    pub fn toggle_favorite(
        &self,
        identity: &dyn Identity,
        movie: &MovieSummary,
    ) -> Result<ToggleOutcome, StorageError> {
        let outcome = self.lock_favorites().toggle_as(identity, movie)?;
        if outcome != ToggleOutcome::LoginRequired {
            self.notify();
        }
        Ok(outcome)
    }

    fn lock_favorites(&self) -> MutexGuard<'_, FavoritesStore> {
        self.favorites.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_preferences(&self) -> MutexGuard<'_, Preferences> {
        self.preferences.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn last_search(&self) -> String {
        self.lock_preferences().last_search().to_string()
    }

    /// Remembers the trimmed term for the next visit; blank input clears it.
    pub fn set_last_search(&self, query: &str) {
        if let Err(e) = self.lock_preferences().set_last_search(query) {
            tracing::warn!(error = %e, "could not persist last search");
        }
        self.notify();
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.lock_preferences().theme_mode()
    }

    pub fn toggle_theme_mode(&self) -> ThemeMode {
        let mut preferences = self.lock_preferences();
        if let Err(e) = preferences.toggle_theme_mode() {
            tracing::warn!(error = %e, "could not persist theme mode");
        }
        let mode = preferences.theme_mode();
        drop(preferences);
        self.notify();
        mode
    }
}

impl std::fmt::Debug for MovieDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieDataStore")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_store(transport: &crate::testing::FakeTransport) -> MovieDataStore {
    MovieDataStore::new(
        transport.client(),
        Arc::new(crate::storage::MemoryStore::new()),
        false,
    )
}
