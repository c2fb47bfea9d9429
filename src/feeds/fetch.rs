//! HTTP transport for feed documents.
//!
//! [`FeedSource`] is the seam between the collector and the network, so the
//! collector can be driven by in-memory documents in tests.

use super::FeedError;
use crate::models::FeedConfig;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Per-feed request timeout.
pub const FEED_TIMEOUT: Duration = Duration::from_secs(12);

/// User-Agent sent with every feed request.
pub const USER_AGENT: &str = "AIImpactBriefBot/1.0";

/// Anything that can hand back the raw body of a feed.
pub trait FeedSource {
    /// Fetch the document behind `feed.url`.
    ///
    /// Non-2xx responses are errors.
    async fn fetch(&self, feed: &FeedConfig) -> Result<String, FeedError>;
}

/// [`FeedSource`] backed by a `reqwest` client with a fixed timeout and User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new() -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FEED_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(level = "info", skip_all, fields(feed = %feed.name, url = %feed.url))]
    async fn fetch(&self, feed: &FeedConfig) -> Result<String, FeedError> {
        let t0 = Instant::now();
        let response = self.client.get(&feed.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: feed.url.clone(),
            });
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched feed document"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_builds() {
        assert!(HttpFeedSource::new().is_ok());
    }

    #[test]
    fn test_status_error_message() {
        let err = FeedError::Status {
            status: 503,
            url: "https://example.com/feed".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP status 503 from https://example.com/feed");
    }
}
