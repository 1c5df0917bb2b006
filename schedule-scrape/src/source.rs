//! Trait definition for schedule page sources.
//!
//! The fetch pipeline only needs "give me the page for this group";
//! [`HttpSource`] does that against the college site, tests plug in
//! in-memory sources.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::http;

/// Something that can produce the raw schedule document for a group.
///
/// All implementations must be `Send + Sync` so a fetcher can be shared
/// across tasks.
pub trait ScheduleSource: Send + Sync {
    /// Fetch the HTML document for `group`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the document could not be obtained.
    fn fetch_document(
        &self,
        group: &str,
    ) -> impl std::future::Future<Output = Result<String, ScrapeError>> + Send;
}

/// Fetches schedule pages over HTTP, one GET per call, no retries.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Build a source from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] for an invalid configuration or
    /// [`ScrapeError::Http`] if the client cannot be constructed.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        config.validate()?;
        Ok(Self {
            client: http::build_client(config)?,
            base_url: config.base_url.clone(),
        })
    }
}

impl ScheduleSource for HttpSource {
    async fn fetch_document(&self, group: &str) -> Result<String, ScrapeError> {
        tracing::trace!(group, "fetching schedule page");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("group", group)])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "ru-RU,ru;q=0.9")
            .send()
            .await?
            .error_for_status()?;

        let html = response.text().await?;

        tracing::trace!(group, bytes = html.len(), "schedule page received");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_source_rejects_invalid_config() {
        let config = ScrapeConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(HttpSource::new(&config).is_err());
    }

    #[test]
    fn http_source_builds_with_default_config() {
        assert!(HttpSource::new(&ScrapeConfig::default()).is_ok());
    }

    #[test]
    fn http_source_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpSource>();
    }
}
