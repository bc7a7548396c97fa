use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::video::{Video, VideoList};

pub type MovieId = u64;

pub const FEATURED_LIMIT: usize = 5;
pub const SHELF_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// `None` means the catalog has no rating, not a rating of zero.
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

impl MovieSummary {
    pub fn release_year(&self) -> Option<&str> {
        self.release_date.as_deref().and_then(|d| d.get(..4))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 1,
            total_results: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageFile {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageGallery {
    #[serde(default)]
    pub backdrops: Vec<ImageFile>,
    #[serde(default)]
    pub posters: Vec<ImageFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Credits,
    pub videos: Option<VideoList>,
    #[serde(default)]
    pub images: ImageGallery,
    pub similar: Option<Paged<MovieSummary>>,
    pub recommendations: Option<Paged<MovieSummary>>,
}

impl MovieDetails {
    pub fn id(&self) -> MovieId {
        self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }

    pub fn director(&self) -> Option<&str> {
        self.credits
            .crew
            .iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name.as_str())
    }

    pub fn writers(&self, limit: usize) -> Vec<&str> {
        self.credits
            .crew
            .iter()
            .filter(|c| c.department == "Writing")
            .map(|c| c.name.as_str())
            .take(limit)
            .collect()
    }

    pub fn billed_cast(&self, limit: usize) -> Vec<&CastMember> {
        let mut cast: Vec<&CastMember> = self.credits.cast.iter().collect();
        cast.sort_by_key(|c| c.order);
        cast.truncate(limit);
        cast
    }

    pub fn photos(&self, limit: usize) -> &[ImageFile] {
        let backdrops = &self.images.backdrops;
        &backdrops[..backdrops.len().min(limit)]
    }

    pub fn embedded_videos(&self) -> Option<&[Video]> {
        self.videos.as_ref().map(|v| v.results.as_slice())
    }

    pub fn similar_movies(&self) -> &[MovieSummary] {
        self.similar
            .as_ref()
            .map(|p| p.results.as_slice())
            .unwrap_or_default()
    }

    pub fn recommended_movies(&self) -> &[MovieSummary] {
        self.recommendations
            .as_ref()
            .map(|p| p.results.as_slice())
            .unwrap_or_default()
    }

    pub fn formatted_runtime(&self) -> String {
        match self.runtime {
            None | Some(0) => String::from("N/A"),
            Some(minutes) => {
                let hours = minutes / 60;
                let mins = minutes % 60;
                if hours > 0 {
                    format!("{}h {}m", hours, mins)
                } else {
                    format!("{}m", mins)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageConfig {
    pub base_url: Option<String>,
    pub secure_base_url: Option<String>,
    #[serde(default)]
    pub poster_sizes: Vec<String>,
    #[serde(default)]
    pub backdrop_sizes: Vec<String>,
}

impl ImageConfig {
    pub fn preferred_base_url(&self) -> Option<&str> {
        self.secure_base_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.base_url.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreCatalog {
    by_id: HashMap<u64, String>,
    list: Vec<Genre>,
}

impl GenreCatalog {
    pub fn new(list: Vec<Genre>) -> Self {
        let by_id = list.iter().map(|g| (g.id, g.name.clone())).collect();
        Self { by_id, list }
    }

    pub fn name(&self, id: u64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn list(&self) -> &[Genre] {
        &self.list
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn names_for(&self, ids: &[u64]) -> Vec<&str> {
        ids.iter().filter_map(|id| self.name(*id)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendingWindow {
    #[default]
    Day,
    Week,
}

impl TrendingWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingWindow::Day => "day",
            TrendingWindow::Week => "week",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SortKey {
    #[default]
    PopularityDesc,
    PopularityAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
    VoteAverageDesc,
    VoteAverageAsc,
    TitleAsc,
    TitleDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::PopularityDesc,
        SortKey::PopularityAsc,
        SortKey::ReleaseDateDesc,
        SortKey::ReleaseDateAsc,
        SortKey::VoteAverageDesc,
        SortKey::VoteAverageAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PopularityDesc => "popularity.desc",
            SortKey::PopularityAsc => "popularity.asc",
            SortKey::ReleaseDateDesc => "release_date.desc",
            SortKey::ReleaseDateAsc => "release_date.asc",
            SortKey::VoteAverageDesc => "vote_average.desc",
            SortKey::VoteAverageAsc => "vote_average.asc",
            SortKey::TitleAsc => "original_title.asc",
            SortKey::TitleDesc => "original_title.desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::PopularityDesc => write!(f, "Popularity Descending"),
            SortKey::PopularityAsc => write!(f, "Popularity Ascending"),
            SortKey::ReleaseDateDesc => write!(f, "Release Date Descending"),
            SortKey::ReleaseDateAsc => write!(f, "Release Date Ascending"),
            SortKey::VoteAverageDesc => write!(f, "Rating Descending"),
            SortKey::VoteAverageAsc => write!(f, "Rating Ascending"),
            SortKey::TitleAsc => write!(f, "Title (A-Z)"),
            SortKey::TitleDesc => write!(f, "Title (Z-A)"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown sort key: {}", s))
    }
}

/// Facets for the discovery endpoint. Empty entries are never sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverFilters {
    pub release_year: Option<u32>,
    pub genre_ids: Vec<u64>,
    pub min_vote_average: Option<f32>,
}

impl DiscoverFilters {
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(year) = self.release_year {
            params.push((String::from("primary_release_year"), year.to_string()));
        }
        if !self.genre_ids.is_empty() {
            let ids: Vec<String> = self.genre_ids.iter().map(u64::to_string).collect();
            params.push((String::from("with_genres"), ids.join(",")));
        }
        if let Some(min) = self.min_vote_average.filter(|v| *v > 0.0) {
            params.push((String::from("vote_average.gte"), min.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shelf {
    Featured,
    Trending,
    Popular,
    TopRated,
    NewReleases,
}

impl Shelf {
    pub const ALL: [Shelf; 5] = [
        Shelf::Featured,
        Shelf::Trending,
        Shelf::Popular,
        Shelf::TopRated,
        Shelf::NewReleases,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Shelf::Featured => "Featured",
            Shelf::Trending => "Trending Today",
            Shelf::Popular => "Popular",
            Shelf::TopRated => "Top Rated",
            Shelf::NewReleases => "New Releases",
        }
    }

    pub fn arrange(&self, mut movies: Vec<MovieSummary>) -> Vec<MovieSummary> {
        match self {
            Shelf::Featured => {
                movies.sort_by(|a, b| {
                    let a = a.vote_average.unwrap_or(f32::MIN);
                    let b = b.vote_average.unwrap_or(f32::MIN);
                    b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
                });
                movies.truncate(FEATURED_LIMIT);
            }
            Shelf::NewReleases => {
                // ISO dates order lexically; undated movies sink to the end.
                movies.sort_by(|a, b| b.release_date.cmp(&a.release_date));
                movies.truncate(SHELF_LIMIT);
            }
            Shelf::Trending | Shelf::Popular | Shelf::TopRated => {
                movies.truncate(SHELF_LIMIT);
            }
        }
        movies
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShelfState {
    pub movies: Vec<MovieSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

pub fn truncate_overview(overview: &str, max_length: usize) -> String {
    if overview.chars().count() <= max_length {
        return overview.to_string();
    }
    let truncated: String = overview.chars().take(max_length).collect();
    format!(
        "{}...",
        truncated.rfind(' ').map_or(truncated.as_str(), |i| &truncated[..i])
    )
}

#[cfg(test)]
pub(crate) fn movie(id: MovieId, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster-{}.jpg", id)),
        backdrop_path: None,
        vote_average: Some(7.0),
        release_date: Some(String::from("2020-01-01")),
        overview: String::new(),
        genre_ids: Vec::new(),
    }
}
