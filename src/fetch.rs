use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::error::ScrapeError;
use crate::settings::Settings;

/// Thin wrapper around one reqwest client configured from `Settings`.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self {
            client,
            delay: Duration::try_from_secs_f64(settings.delay_secs).unwrap_or_default(),
        })
    }

    /// Pause inserted between consecutive requests of a batch.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// GET `url` and return the body, failing on any non-2xx status.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let parsed = validate_url(url)?;

        info!("Sending request to {}", url);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| ScrapeError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ScrapeError::Body {
            url: url.to_string(),
            source,
        })?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

pub fn validate_url(url: &str) -> Result<Url, ScrapeError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
