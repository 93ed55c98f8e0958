use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no divs with data-lyrics-container=\"true\" found on {0}")]
    NoContainers(String),
}

impl ScrapeError {
    /// True for failures on the network side (as opposed to "nothing to extract").
    pub fn is_network(&self) -> bool {
        !matches!(self, ScrapeError::NoContainers(_))
    }
}
