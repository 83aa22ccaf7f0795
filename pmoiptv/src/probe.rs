//! Stream availability probing
//!
//! A probe answers one question: is this endpoint reachable right now? Every
//! failure mode (transport error, timeout, non-success status) collapses to
//! `false`, the caller never sees an error.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client};
use std::time::Duration;
use tracing::debug;

/// Hard limit on a single probe (8 seconds)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 8;

/// Client signature sent with every probe, some origins reject unknown agents
pub const DEFAULT_PROBE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Reachability check for one stream endpoint
///
/// Implementations must never panic and must return within a bounded time.
#[async_trait]
pub trait StreamProbe: Send + Sync {
    async fn probe(&self, url: &str) -> bool;
}

/// Probe issuing a `HEAD` request (no body transfer)
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
    user_agent: String,
}

impl HttpProbe {
    /// Probe with the default timeout and client signature
    pub fn new() -> Result<Self> {
        Self::with_settings(
            Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            DEFAULT_PROBE_USER_AGENT,
        )
    }

    pub fn with_settings(timeout: Duration, user_agent: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, timeout, user_agent))
    }

    /// Reuse an existing connection pool
    pub fn with_client(client: Client, timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            timeout,
            user_agent: user_agent.into(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl StreamProbe for HttpProbe {
    async fn probe(&self, url: &str) -> bool {
        let request = self
            .client
            .head(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send();

        // Dropping the future on expiry cancels the in-flight request
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let ok = response.status().is_success();
                if !ok {
                    debug!(url = %url, status = %response.status(), "Stream probe rejected");
                }
                ok
            }
            Ok(Err(e)) => {
                debug!(url = %url, "Stream probe failed: {}", e);
                false
            }
            Err(_) => {
                debug!(url = %url, timeout = ?self.timeout, "Stream probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let probe = HttpProbe::new().unwrap();
        assert_eq!(probe.timeout(), Duration::from_secs(8));
        assert_eq!(probe.user_agent(), DEFAULT_PROBE_USER_AGENT);
    }

    #[tokio::test]
    async fn test_unparseable_endpoint_is_unavailable() {
        let probe = HttpProbe::with_settings(Duration::from_secs(1), "test").unwrap();
        assert!(!probe.probe("not a url").await);
        assert!(!probe.probe("").await);
    }

    #[tokio::test]
    async fn test_refused_connection_is_unavailable() {
        let probe = HttpProbe::with_settings(Duration::from_secs(2), "test").unwrap();
        // Port 9 (discard) is not listening on loopback in test environments
        assert!(!probe.probe("http://127.0.0.1:9/stream.m3u8").await);
    }
}
