use crate::media::{DiscoverFilters, MovieSummary, SortKey};
use crate::store::MovieDataStore;

pub const DISCOVER_FAILED: &str = "Could not load more movies. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverySession {
    pub sort_key: SortKey,
    pub filters: DiscoverFilters,
    /// Last page loaded; 0 before the first fetch.
    pub page: u32,
    /// `None` until the service has reported a page count.
    pub total_pages: Option<u32>,
    pub results: Vec<MovieSummary>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl DiscoverySession {
    pub fn has_more(&self) -> bool {
        self.total_pages.is_none_or(|total| self.page < total)
    }
}

impl MovieDataStore {
    pub fn discovery_session(&self) -> DiscoverySession {
        self.read(|state| state.data.discovery.clone())
    }

    /// Loads the next discovery page, or page 1 of a fresh session when
    /// `reset` is set (new sort order or filter set).
    ///
    /// Without `reset` the call does nothing while a page is in flight or
    /// once the last known page has been loaded. A failed page keeps the
    /// results already shown.
    pub async fn fetch_or_load_more(&self, sort_key: SortKey, filters: &DiscoverFilters, reset: bool) {
        let request = self.read(|state| {
            let session = &state.data.discovery;
            if session.is_loading && !reset {
                return None;
            }
            let page = if reset { 1 } else { session.page + 1 };
            match session.total_pages {
                Some(total) if !reset && page > total => None,
                _ => Some(page),
            }
        });
        let Some(page) = request else {
            tracing::debug!(sort_by = sort_key.as_str(), "discovery load skipped");
            return;
        };

        // Checked and claimed under one lock so a concurrent call cannot
        // slip in between.
        let seq = self.update(|state| {
            let session = &mut state.data.discovery;
            if session.is_loading && !reset {
                return None;
            }
            if reset {
                session.results.clear();
                session.page = 0;
                session.total_pages = None;
                session.sort_key = sort_key;
                session.filters = filters.clone();
            }
            session.is_loading = true;
            session.error = None;
            state.discovery_seq += 1;
            Some(state.discovery_seq)
        });
        let Some(seq) = seq else {
            return;
        };

        let result = self.client.discover(page, sort_key, filters).await;

        self.update(|state| {
            if state.discovery_seq != seq {
                tracing::debug!(page, "discarding stale discovery response");
                return;
            }
            let session = &mut state.data.discovery;
            match result {
                Ok(data) => {
                    if reset {
                        session.results = data.results;
                    } else {
                        session.results.extend(data.results);
                    }
                    session.page = data.page.max(1);
                    session.total_pages = Some(data.total_pages.max(1));
                    session.sort_key = sort_key;
                    session.filters = filters.clone();
                    tracing::info!(
                        page = session.page,
                        total_pages = data.total_pages,
                        shown = session.results.len(),
                        "discovery page loaded"
                    );
                }
                Err(e) => {
                    tracing::error!(page, sort_by = sort_key.as_str(), error = %e, "error discovering movies");
                    session.error = Some(String::from(DISCOVER_FAILED));
                }
            }
            session.is_loading = false;
        });
    }
}
