use crate::error::ApiError;
use crate::media::{MovieDetails, MovieId, MovieSummary};
use crate::store::MovieDataStore;
use crate::video::{pick_best_trailer_key, Video};

pub const MISSING_ID: &str = "No movie ID provided.";
pub const NOT_FOUND: &str = "Movie not found.";
pub const DETAILS_FAILED: &str = "Failed to load movie details. Please try again later.";
pub const TRAILER_FAILED: &str = "Could not load trailer.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsView {
    pub movie: Option<MovieDetails>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailerLookup {
    Found(String),
    NotAvailable(String),
    Failed(String),
}

impl MovieDataStore {
    pub fn details_view(&self) -> DetailsView {
        self.read(|state| state.data.details.clone())
    }

    /// Fetches the full details of one movie into the details view. Nothing
    /// is cached; every call goes to the network.
    pub async fn load_movie_details(&self, id: Option<MovieId>) {
        let Some(id) = id else {
            self.update(|state| {
                state.details_seq += 1;
                state.data.details = DetailsView {
                    error: Some(String::from(MISSING_ID)),
                    ..Default::default()
                };
            });
            return;
        };

        let seq = self.update(|state| {
            state.details_seq += 1;
            state.data.details = DetailsView {
                loading: true,
                ..Default::default()
            };
            state.details_seq
        });

        let result = self.client.fetch_movie_details(id).await;

        self.update(|state| {
            if state.details_seq != seq {
                tracing::debug!(movie_id = id, "discarding stale details response");
                return;
            }
            let view = &mut state.data.details;
            match result {
                Ok(details) => {
                    tracing::info!(movie_id = id, title = details.title(), "movie details loaded");
                    view.movie = Some(details);
                }
                Err(ApiError::NotFound) => {
                    tracing::warn!(movie_id = id, "movie not found");
                    view.error = Some(String::from(NOT_FOUND));
                }
                Err(e) => {
                    tracing::error!(movie_id = id, error = %e, "error fetching movie details");
                    view.error = Some(String::from(DETAILS_FAILED));
                }
            }
            view.loading = false;
        });
    }

    /// Picks a trailer from `embedded` when the caller already has the video
    /// list, otherwise asks the videos endpoint.
    pub async fn find_trailer(&self, movie: &MovieSummary, embedded: Option<&[Video]>) -> TrailerLookup {
        let key = match embedded {
            Some(videos) => pick_best_trailer_key(videos).map(str::to_string),
            None => match self.client.fetch_movie_videos(movie.id).await {
                Ok(videos) => pick_best_trailer_key(&videos).map(str::to_string),
                Err(e) => {
                    tracing::error!(movie_id = movie.id, error = %e, "error fetching trailer");
                    return TrailerLookup::Failed(String::from(TRAILER_FAILED));
                }
            },
        };
        match key {
            Some(key) => TrailerLookup::Found(key),
            None => {
                tracing::info!(movie_id = movie.id, "no trailer available");
                TrailerLookup::NotAvailable(format!("No trailer found for {}.", movie.title))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_store;
    use crate::testing::FakeTransport;
    use serde_json::json;

    fn details_json(id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Arrival",
            "runtime": 116,
            "genres": [{"id": 18, "name": "Drama"}],
            "credits": {
                "cast": [{"id": 1, "name": "Amy Adams", "character": "Louise", "order": 0}],
                "crew": [{"id": 2, "name": "Denis Villeneuve", "job": "Director", "department": "Directing"}]
            },
            "videos": {"results": [
                {"key": "tease", "site": "YouTube", "type": "Teaser"},
                {"key": "trail", "site": "YouTube", "type": "Trailer", "official": true}
            ]},
            "similar": {"page": 1, "results": [{"id": 9, "title": "Sicario"}]}
        })
    }

    #[tokio::test]
    async fn loads_details_with_embedded_extras() {
        let transport = FakeTransport::new();
        transport.respond("/movie/329865", details_json(329865));
        let store = test_store(&transport);

        store.load_movie_details(Some(329865)).await;

        let view = store.details_view();
        assert!(!view.loading);
        assert_eq!(view.error, None);
        let movie = view.movie.unwrap();
        assert_eq!(movie.title(), "Arrival");
        assert_eq!(movie.director(), Some("Denis Villeneuve"));
        assert_eq!(movie.formatted_runtime(), "1h 56m");
        assert_eq!(movie.similar_movies()[0].id, 9);

        let calls = transport.calls("/movie/329865");
        assert!(calls[0]
            .iter()
            .any(|(k, v)| k == "append_to_response" && v.contains("credits")));
    }

    #[tokio::test]
    async fn missing_id_skips_the_network() {
        let transport = FakeTransport::new();
        let store = test_store(&transport);

        store.load_movie_details(None).await;

        let view = store.details_view();
        assert_eq!(view.error.as_deref(), Some(MISSING_ID));
        assert!(view.movie.is_none());
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn unknown_movie_reports_not_found() {
        let transport = FakeTransport::new();
        transport.fail("/movie/1", ApiError::NotFound);
        transport.fail("/movie/2", ApiError::Status(500));
        let store = test_store(&transport);

        store.load_movie_details(Some(1)).await;
        assert_eq!(store.details_view().error.as_deref(), Some(NOT_FOUND));

        store.load_movie_details(Some(2)).await;
        assert_eq!(store.details_view().error.as_deref(), Some(DETAILS_FAILED));
    }

    #[tokio::test]
    async fn details_are_refetched_every_time() {
        let transport = FakeTransport::new();
        transport.respond("/movie/5", details_json(5));
        let store = test_store(&transport);

        store.load_movie_details(Some(5)).await;
        store.load_movie_details(Some(5)).await;
        assert_eq!(transport.call_count("/movie/5"), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn newer_details_request_wins() {
        let transport = FakeTransport::new();
        transport.respond("/movie/1", details_json(1));
        transport.respond("/movie/2", details_json(2));
        let gate = transport.hold("/movie/1");
        let store = test_store(&transport);

        tokio::join!(store.load_movie_details(Some(1)), async {
            store.load_movie_details(Some(2)).await;
            gate.notify_one();
        });

        assert_eq!(store.details_view().movie.map(|m| m.id()), Some(2));
    }

    #[tokio::test]
    async fn trailer_from_embedded_videos_needs_no_request() {
        let transport = FakeTransport::new();
        transport.respond("/movie/7", details_json(7));
        let store = test_store(&transport);
        store.load_movie_details(Some(7)).await;
        let movie = store.details_view().movie.unwrap();

        let lookup = store
            .find_trailer(&movie.summary, movie.embedded_videos())
            .await;

        assert_eq!(lookup, TrailerLookup::Found(String::from("trail")));
        assert_eq!(transport.call_count("/movie/7/videos"), 0);
    }

    #[tokio::test]
    async fn trailer_falls_back_to_videos_endpoint() {
        let transport = FakeTransport::new();
        transport.respond(
            "/movie/550/videos",
            json!({"results": [{"key": "clip", "site": "YouTube", "type": "Clip"}]}),
        );
        let store = test_store(&transport);
        let movie = crate::media::movie(550, "Fight Club");

        let lookup = store.find_trailer(&movie, None).await;

        assert_eq!(lookup, TrailerLookup::Found(String::from("clip")));
        assert_eq!(transport.call_count("/movie/550/videos"), 1);
    }

    #[tokio::test]
    async fn trailer_not_available_or_failed() {
        let transport = FakeTransport::new();
        transport.respond(
            "/movie/1/videos",
            json!({"results": [{"key": "v", "site": "Vimeo", "type": "Trailer"}]}),
        );
        transport.fail("/movie/2/videos", ApiError::Network(String::from("timeout")));
        let store = test_store(&transport);

        assert_eq!(
            store.find_trailer(&crate::media::movie(1, "Heat"), None).await,
            TrailerLookup::NotAvailable(String::from("No trailer found for Heat."))
        );
        assert_eq!(
            store.find_trailer(&crate::media::movie(2, "Ran"), None).await,
            TrailerLookup::Failed(String::from(TRAILER_FAILED))
        );
    }
}
