//! Error types for the IPTV pipeline

/// Result type alias for IPTV pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while refreshing the channel list
///
/// Only feed, empty-result, configuration and write failures ever reach the
/// caller of a pipeline run. Probe failures become `enabled = false` and
/// per-record parse failures drop the record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Playlist source answered with a non-success status
    #[error("Playlist feed {url} returned status {status}")]
    FeedStatus { status: u16, url: String },

    /// Playlist fetched but no channel could be parsed from it
    #[error("No streams found")]
    EmptyFeed,

    /// Directive line could not be turned into a channel
    #[error("Invalid directive line: {0}")]
    InvalidDirective(String),

    /// JSON (de)serialization failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (from pmoconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// `true` when the run failed because the feed held no channel
    pub fn is_empty_feed(&self) -> bool {
        matches!(self, Self::EmptyFeed)
    }
}
