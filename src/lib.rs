pub mod details;
pub mod discover;
pub mod error;
pub mod favorites;
pub mod logging;
pub mod media;
pub mod preferences;
pub mod search;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;
pub mod tmdb;
pub mod video;

#[cfg(test)]
mod testing;

pub use details::{DetailsView, TrailerLookup};
pub use discover::DiscoverySession;
pub use error::{ApiError, StorageError};
pub use favorites::{FavoriteEntry, FavoritesStore, ToggleOutcome};
pub use media::{DiscoverFilters, MovieDetails, MovieId, MovieSummary, SearchFilters, Shelf, SortKey};
pub use preferences::ThemeMode;
pub use search::SearchSession;
pub use session::{Anonymous, Identity, SignedIn, UserProfile};
pub use settings::AppSettings;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{MovieDataSnapshot, MovieDataStore};
pub use tmdb::TmdbClient;
