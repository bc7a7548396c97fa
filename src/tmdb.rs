use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::ApiError;
use crate::media::{
    DiscoverFilters, Genre, GenreCatalog, ImageConfig, MovieDetails, MovieId, MovieSummary, Paged,
    SortKey, TrendingWindow,
};
use crate::settings::AppSettings;
use crate::video::{Video, VideoList};

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";
pub const DETAILS_APPEND: &str = "credits,videos,images,release_dates,similar,recommendations";

pub const POSTER_SIZE: &str = "w342";
pub const BACKDROP_SIZE: &str = "w1280";
pub const PROFILE_SIZE: &str = "w185";

static SIZE_WIDTH: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"w(\d+)"));

pub type Query = Vec<(String, String)>;

/// The HTTP seam. Implementations perform one GET and hand back the decoded
/// JSON body, mapping non-success statuses to [`ApiError`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(String, String)])
        -> Result<serde_json::Value, ApiError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if let Some(error) = ApiError::from_status(response.status().as_u16()) {
            return Err(error);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ConfigurationResponse {
    #[serde(default)]
    images: ImageConfig,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<Genre>,
}

/// Catalog client. Image configuration and the genre table are fetched at
/// most once per client (clones share them) and never invalidated.
#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    language: String,
    transport: Arc<dyn Transport>,
    image_config: Arc<OnceCell<ImageConfig>>,
    genres: Arc<OnceCell<GenreCatalog>>,
}

impl TmdbClient {
    pub fn new(api_key: String, language: String, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key,
            base_url: String::from(crate::settings::DEFAULT_API_BASE_URL),
            language,
            transport,
            image_config: Arc::new(OnceCell::new()),
            genres: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            settings.api_key.trim().to_string(),
            settings.language().to_string(),
            Arc::new(ReqwestTransport::new()),
        )
        .with_base_url(settings.api_base_url())
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn base_params(&self) -> Query {
        vec![
            (String::from("api_key"), self.api_key.clone()),
            (String::from("language"), self.language.clone()),
        ]
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        extra: Query,
    ) -> Result<T, ApiError> {
        let mut query = self.base_params();
        query.extend(extra);
        tracing::debug!(endpoint, "catalog request");
        let json = self
            .transport
            .get_json(&self.build_url(endpoint), &query)
            .await
            .inspect_err(|e| tracing::warn!(endpoint, error = %e, "catalog request failed"))?;
        serde_json::from_value(json).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn fetch_page(&self, endpoint: &str, page: u32) -> Result<Paged<MovieSummary>, ApiError> {
        self.fetch_json(endpoint, vec![(String::from("page"), page.to_string())])
            .await
    }

    /// Image configuration, fetched on first success and reused afterwards.
    pub async fn fetch_config(&self) -> Result<ImageConfig, ApiError> {
        self.image_config
            .get_or_try_init(|| async {
                tracing::info!("fetching catalog image configuration");
                let response: ConfigurationResponse =
                    self.fetch_json("/configuration", Vec::new()).await?;
                Ok::<_, ApiError>(response.images)
            })
            .await
            .cloned()
    }

    /// Genre table. A failed fetch degrades to an empty catalog so filter
    /// lists still render; it is not cached, so the next call retries.
    pub async fn fetch_genres(&self) -> GenreCatalog {
        let result = self
            .genres
            .get_or_try_init(|| async {
                tracing::info!("fetching movie genres");
                let response: GenreListResponse =
                    self.fetch_json("/genre/movie/list", Vec::new()).await?;
                Ok::<_, ApiError>(GenreCatalog::new(response.genres))
            })
            .await;
        match result {
            Ok(catalog) => catalog.clone(),
            Err(e) => {
                tracing::error!(error = %e, "could not fetch movie genres");
                GenreCatalog::default()
            }
        }
    }

    pub fn cached_genres(&self) -> Option<&GenreCatalog> {
        self.genres.get()
    }

    /// Loads the shared configuration and genre table if they are not cached
    /// yet. Only a configuration failure is an error.
    pub async fn ensure_loaded(&self) -> Result<GenreCatalog, ApiError> {
        self.fetch_config().await?;
        Ok(self.fetch_genres().await)
    }

    pub async fn fetch_trending(
        &self,
        window: TrendingWindow,
        page: u32,
    ) -> Result<Paged<MovieSummary>, ApiError> {
        self.fetch_page(&format!("/trending/movie/{}", window.as_str()), page)
            .await
    }

    pub async fn fetch_popular(&self, page: u32) -> Result<Paged<MovieSummary>, ApiError> {
        self.fetch_page("/movie/popular", page).await
    }

    pub async fn fetch_top_rated(&self, page: u32) -> Result<Paged<MovieSummary>, ApiError> {
        self.fetch_page("/movie/top_rated", page).await
    }

    pub async fn fetch_upcoming(&self, page: u32) -> Result<Paged<MovieSummary>, ApiError> {
        self.fetch_page("/movie/upcoming", page).await
    }

    pub async fn search_movies(
        &self,
        query: &str,
        page: u32,
        year: Option<u32>,
    ) -> Result<Paged<MovieSummary>, ApiError> {
        let mut params = vec![
            (String::from("query"), query.to_string()),
            (String::from("page"), page.to_string()),
            (String::from("include_adult"), String::from("false")),
        ];
        if let Some(year) = year {
            params.push((String::from("primary_release_year"), year.to_string()));
        }
        tracing::info!(query, page, "searching movies");
        self.fetch_json("/search/movie", params).await
    }

    pub async fn fetch_movie_details(&self, id: MovieId) -> Result<MovieDetails, ApiError> {
        self.fetch_json(
            &format!("/movie/{}", id),
            vec![(String::from("append_to_response"), String::from(DETAILS_APPEND))],
        )
        .await
    }

    pub async fn fetch_movie_videos(&self, id: MovieId) -> Result<Vec<Video>, ApiError> {
        let response: VideoList = self
            .fetch_json(&format!("/movie/{}/videos", id), Vec::new())
            .await?;
        Ok(response.results)
    }

    pub async fn discover(
        &self,
        page: u32,
        sort_key: SortKey,
        filters: &DiscoverFilters,
    ) -> Result<Paged<MovieSummary>, ApiError> {
        let mut params = vec![
            (String::from("page"), page.to_string()),
            (String::from("sort_by"), String::from(sort_key.as_str())),
            (String::from("include_adult"), String::from("false")),
            (String::from("include_video"), String::from("false")),
        ];
        params.extend(filters.query_params());
        tracing::info!(page, sort_by = sort_key.as_str(), "discovering movies");
        self.fetch_json("/discover/movie", params).await
    }

    /// Full image URL, or a size-matched placeholder when there is no path.
    /// Uses the fetched configuration when present, otherwise the default
    /// image host.
    pub fn image_url(&self, path: Option<&str>, size: &str) -> String {
        let base = self
            .image_config
            .get()
            .and_then(ImageConfig::preferred_base_url)
            .unwrap_or(DEFAULT_IMAGE_BASE_URL);
        resolve_image_url(base, path, size)
    }
}

pub fn resolve_image_url(base: &str, path: Option<&str>, size: &str) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{}{}{}", base, size, path),
        None => placeholder_url(size),
    }
}

pub fn placeholder_url(size: &str) -> String {
    let width = SIZE_WIDTH
        .as_ref()
        .ok()
        .and_then(|re| re.captures(size))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(300);
    let height = (f64::from(width) * 1.5).round() as u32;
    format!(
        "https://via.placeholder.com/{}x{}?text=No+Image",
        width, height
    )
}
