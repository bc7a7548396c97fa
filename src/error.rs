use thiserror::Error;

/// Failure of a single catalog request. No request is ever retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("unauthorized, check the TMDB API key")]
    Unauthorized,
    #[error("resource not found")]
    NotFound,
    #[error("rate limited by the catalog service")]
    RateLimit,
    #[error("unexpected response payload: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(ApiError::Unauthorized),
            404 => Some(ApiError::NotFound),
            429 => Some(ApiError::RateLimit),
            s if s >= 400 => Some(ApiError::Status(s)),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_http_statuses() {
        assert_eq!(ApiError::from_status(200), None);
        assert_eq!(ApiError::from_status(304), None);
        assert_eq!(ApiError::from_status(401), Some(ApiError::Unauthorized));
        assert_eq!(ApiError::from_status(404), Some(ApiError::NotFound));
        assert_eq!(ApiError::from_status(429), Some(ApiError::RateLimit));
        assert_eq!(ApiError::from_status(503), Some(ApiError::Status(503)));
    }
}
