use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub site: String,
    #[serde(default, rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: bool,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

impl Video {
    fn is_youtube(&self) -> bool {
        self.site == "YouTube" && !self.key.is_empty()
    }
}

/// Officially tagged trailers win, then any trailer, then teasers, then any
/// YouTube clip at all.
pub fn select_best_trailer(videos: &[Video]) -> Option<&Video> {
    first_youtube(videos, |v| v.video_type == "Trailer" && v.official)
        .or_else(|| first_youtube(videos, |v| v.video_type == "Trailer"))
        .or_else(|| first_youtube(videos, |v| v.video_type == "Teaser"))
        .or_else(|| first_youtube(videos, |_| true))
}

fn first_youtube(videos: &[Video], accept: impl Fn(&Video) -> bool) -> Option<&Video> {
    videos.iter().find(|v| v.is_youtube() && accept(v))
}

pub fn pick_best_trailer_key(videos: &[Video]) -> Option<&str> {
    select_best_trailer(videos).map(|v| v.key.as_str())
}

pub fn youtube_embed_url(key: &str) -> String {
    format!("https://www.youtube.com/embed/{}?autoplay=1&rel=0", key)
}
