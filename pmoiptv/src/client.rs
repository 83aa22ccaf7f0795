//! HTTP client for the playlist feed
//!
//! Fetches the remote extended M3U document and hands it to the parser.
//!
//! # Example
//!
//! ```no_run
//! use pmoiptv::PlaylistClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlaylistClient::new()?;
//!     let channels = client.fetch_channels().await?;
//!     println!("{} channels in the feed", channels.len());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::m3u::parse_playlist;
use crate::models::ChannelRecord;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Greek IPTV playlist, pinned to a known revision
pub const DEFAULT_PLAYLIST_URL: &str = "https://raw.githubusercontent.com/free-greek-iptv/greek-iptv/beb997e089f6a8fd5b0d62251516f82dac392c3b/Greekstreamtv.m3u";

/// Default timeout for the feed request (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "PMOIptv/0.1.0 (pmoiptv)";

/// Playlist feed client
///
/// Stateless: every call performs a fresh request.
#[derive(Debug, Clone)]
pub struct PlaylistClient {
    client: Client,
    playlist_url: String,
    timeout: Duration,
}

impl PlaylistClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client with a custom reqwest::Client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            playlist_url: DEFAULT_PLAYLIST_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn playlist_url(&self) -> &str {
        &self.playlist_url
    }

    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Download the raw playlist document
    ///
    /// A transport failure is [`Error::Http`], a non-success answer is
    /// [`Error::FeedStatus`].
    pub async fn fetch_playlist(&self) -> Result<String> {
        debug!(url = %self.playlist_url, "Fetching playlist");

        let response = self
            .client
            .get(&self.playlist_url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedStatus {
                status: status.as_u16(),
                url: self.playlist_url.clone(),
            });
        }

        Ok(response.text().await?)
    }

    /// Download and parse the playlist
    ///
    /// An empty result is not an error at this level.
    pub async fn fetch_channels(&self) -> Result<Vec<ChannelRecord>> {
        let content = self.fetch_playlist().await?;
        let channels = parse_playlist(&content);

        info!(
            url = %self.playlist_url,
            bytes = content.len(),
            channels = channels.len(),
            "Playlist parsed"
        );

        Ok(channels)
    }
}

/// Builder for [`PlaylistClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    playlist_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            playlist_url: DEFAULT_PLAYLIST_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn playlist_url(mut self, url: impl Into<String>) -> Self {
        self.playlist_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<PlaylistClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(PlaylistClient {
            client,
            playlist_url: self.playlist_url,
            timeout: self.timeout,
        })
    }
}
