use crate::error::ApiError;
use crate::media::{MovieSummary, Paged, SearchFilters};
use crate::store::MovieDataStore;

pub const SEARCH_FAILED: &str = "Failed to fetch search results. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    pub query: String,
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<MovieSummary>,
    pub is_searching: bool,
    pub error: Option<String>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            total_pages: 1,
            results: Vec::new(),
            is_searching: false,
            error: None,
        }
    }
}

impl SearchSession {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

impl MovieDataStore {
    pub fn search_session(&self) -> SearchSession {
        self.read(|state| state.data.search.clone())
    }

    pub fn set_search_query(&self, query: &str) {
        self.update(|state| state.data.search.query = query.to_string());
    }

    /// Runs one page of a keyword search.
    ///
    /// A new search (`append == false`) replaces the results and remembers
    /// the query; `append` adds the page to what is already shown. A blank
    /// query resets the session without touching the network.
    pub async fn perform_search(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
        append: bool,
    ) {
        let query = query.trim();
        if query.is_empty() {
            self.update(|state| {
                state.search_seq += 1;
                state.data.search = SearchSession::default();
            });
            return;
        }

        let seq = self.update(|state| {
            state.search_seq += 1;
            let session = &mut state.data.search;
            session.is_searching = true;
            session.error = None;
            if !append {
                session.query = query.to_string();
            }
            state.search_seq
        });

        let result = self.fetch_search_page(query, page, filters).await;

        self.update(|state| {
            if state.search_seq != seq {
                tracing::debug!(query, page, "discarding stale search response");
                return;
            }
            let session = &mut state.data.search;
            match result {
                Ok(data) => {
                    let empty = data.results.is_empty();
                    if append {
                        session.results.extend(data.results);
                    } else {
                        session.results = data.results;
                    }
                    session.page = data.page.max(1);
                    session.total_pages = data.total_pages.max(1);
                    if empty && !append {
                        session.error = Some(format!("No results found for \"{}\".", query));
                    }
                    tracing::info!(
                        query,
                        page = session.page,
                        total_pages = session.total_pages,
                        shown = session.results.len(),
                        "search page loaded"
                    );
                }
                Err(e) => {
                    tracing::error!(query, page, error = %e, "error searching movies");
                    session.error = Some(String::from(SEARCH_FAILED));
                    if !append {
                        session.results.clear();
                    }
                }
            }
            session.is_searching = false;
        });
    }

    pub async fn load_more_search_results(&self, filters: &SearchFilters) {
        let next = self.read(|state| {
            let session = &state.data.search;
            (!session.is_searching && session.has_more() && !session.query.is_empty())
                .then(|| (session.query.clone(), session.page + 1))
        });
        if let Some((query, page)) = next {
            self.perform_search(&query, page, filters, true).await;
        }
    }

    async fn fetch_search_page(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> Result<Paged<MovieSummary>, ApiError> {
        self.client.fetch_config().await?;
        self.client.search_movies(query, page, filters.year).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_store;
    use crate::testing::{page_json, FakeTransport};
    use serde_json::json;

    fn scripted() -> FakeTransport {
        let transport = FakeTransport::new();
        transport.respond("/configuration", json!({"images": {}}));
        transport
    }

    fn ids(session: &SearchSession) -> Vec<u64> {
        session.results.iter().map(|m| m.id).collect()
    }

    #[tokio::test]
    async fn append_keeps_first_page_in_order() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 5, &(1..=20).collect::<Vec<_>>()));
        transport.respond("/search/movie", page_json(2, 5, &(21..=40).collect::<Vec<_>>()));
        let store = test_store(&transport);

        store
            .perform_search("batman", 1, &SearchFilters::default(), false)
            .await;
        let first = store.search_session();
        assert_eq!(first.results.len(), 20);
        assert_eq!(first.total_pages, 5);
        assert_eq!(first.query, "batman");

        store
            .perform_search("batman", 2, &SearchFilters::default(), true)
            .await;
        let second = store.search_session();
        assert_eq!(second.results.len(), 40);
        assert_eq!(second.results[..20], first.results[..]);
        assert_eq!(ids(&second), (1..=40).collect::<Vec<_>>());
        assert_eq!(second.page, 2);
        assert!(second.has_more());
    }

    #[tokio::test]
    async fn blank_query_resets_without_network() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 3, &[1, 2]));
        let store = test_store(&transport);
        store
            .perform_search("alien", 1, &SearchFilters::default(), false)
            .await;

        store
            .perform_search("   ", 1, &SearchFilters::default(), false)
            .await;

        assert_eq!(store.search_session(), SearchSession::default());
        assert_eq!(transport.call_count("/search/movie"), 1);
    }

    #[tokio::test]
    async fn empty_new_search_reports_no_results() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 1, &[]));
        let store = test_store(&transport);

        store
            .perform_search("  zzzzqx ", 1, &SearchFilters::default(), false)
            .await;

        let session = store.search_session();
        assert_eq!(
            session.error.as_deref(),
            Some("No results found for \"zzzzqx\".")
        );
        assert!(!session.is_searching);
    }

    #[tokio::test]
    async fn empty_appended_page_is_not_an_error() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 2, &[1, 2]));
        transport.respond("/search/movie", page_json(2, 2, &[]));
        let store = test_store(&transport);

        store.perform_search("heat", 1, &SearchFilters::default(), false).await;
        store.perform_search("heat", 2, &SearchFilters::default(), true).await;

        let session = store.search_session();
        assert_eq!(session.error, None);
        assert_eq!(ids(&session), vec![1, 2]);
    }

    #[tokio::test]
    async fn append_does_not_overwrite_remembered_query() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 2, &[1]));
        transport.respond("/search/movie", page_json(2, 2, &[2]));
        let store = test_store(&transport);

        store.perform_search("heat", 1, &SearchFilters::default(), false).await;
        store.perform_search("other", 2, &SearchFilters::default(), true).await;
        assert_eq!(store.search_session().query, "heat");
    }

    #[tokio::test]
    async fn failed_append_keeps_previous_results() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 3, &[1, 2, 3]));
        transport.fail("/search/movie", ApiError::Status(502));
        let store = test_store(&transport);

        store.perform_search("up", 1, &SearchFilters::default(), false).await;
        store.perform_search("up", 2, &SearchFilters::default(), true).await;

        let session = store.search_session();
        assert_eq!(ids(&session), vec![1, 2, 3]);
        assert_eq!(session.error.as_deref(), Some(SEARCH_FAILED));
    }

    #[tokio::test]
    async fn failed_new_search_clears_results() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 3, &[1, 2, 3]));
        transport.fail("/search/movie", ApiError::Network(String::from("down")));
        let store = test_store(&transport);

        store.perform_search("up", 1, &SearchFilters::default(), false).await;
        store.perform_search("down", 1, &SearchFilters::default(), false).await;

        let session = store.search_session();
        assert!(session.results.is_empty());
        assert_eq!(session.error.as_deref(), Some(SEARCH_FAILED));
    }

    #[tokio::test]
    async fn year_filter_reaches_the_request() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 1, &[7]));
        let store = test_store(&transport);

        let filters = SearchFilters { year: Some(1984) };
        store.perform_search("dune", 1, &filters, false).await;

        let calls = transport.calls("/search/movie");
        assert!(calls[0]
            .iter()
            .any(|(k, v)| k == "primary_release_year" && v == "1984"));
    }

    #[tokio::test]
    async fn load_more_requests_the_next_page() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 2, &[1]));
        transport.respond("/search/movie", page_json(2, 2, &[2]));
        let store = test_store(&transport);

        store.perform_search("jaws", 1, &SearchFilters::default(), false).await;
        store.load_more_search_results(&SearchFilters::default()).await;
        store.load_more_search_results(&SearchFilters::default()).await;

        assert_eq!(ids(&store.search_session()), vec![1, 2]);
        assert_eq!(transport.call_count("/search/movie"), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stale_response_is_discarded() {
        let transport = scripted();
        transport.respond("/search/movie", page_json(1, 1, &[1]));
        transport.respond("/search/movie", page_json(1, 1, &[2]));
        let gate = transport.hold("/search/movie");
        let store = test_store(&transport);
        let filters = SearchFilters::default();

        tokio::join!(store.perform_search("old", 1, &filters, false), async {
            store.perform_search("new", 1, &filters, false).await;
            gate.notify_one();
        });

        let session = store.search_session();
        assert_eq!(session.query, "new");
        assert_eq!(ids(&session), vec![2]);
        assert!(!session.is_searching);
    }
}
