//! IPTV channel list for PMOIptv
//!
//! This crate fetches an extended M3U playlist of live TV channels, checks
//! which streams currently answer, and publishes the result as a JSON
//! snapshot.
//!
//! # Pipeline
//!
//! - **Parsing**: directive/endpoint pairs become [`ChannelRecord`]s
//!   ([`m3u`])
//! - **Probing**: one `HEAD` request per stream with a hard timeout
//!   ([`HttpProbe`])
//! - **Batching**: a few probes at a time, with a pause between groups
//!   ([`BatchScheduler`])
//! - **Curation**: denylist, insecure transport removal, available-first
//!   ordering ([`CurationPolicy`])
//! - **Snapshot**: `streams.json` rewritten on each successful run
//!   ([`SnapshotWriter`])
//!
//! # Example
//!
//! ```no_run
//! use pmoiptv::{IptvPipeline, IptvSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = IptvPipeline::from_settings(&IptvSettings::default())?;
//!
//!     let report = pipeline.refresh().await?;
//!     println!(
//!         "{} streams, {} enabled ({}%) -> {}",
//!         report.stats.total,
//!         report.stats.enabled,
//!         report.stats.enabled_percentage,
//!         report.file_path
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration Extension
//!
//! With the `pmoconfig` feature, [`IptvConfigExt`] reads every setting from
//! the `sources.iptv` section of the configuration.
//!
//! # Server Extension
//!
//! With the `server` feature, [`IptvExt`] mounts the refresh trigger and the
//! snapshot endpoint under `/api/iptv` on a `pmoserver::Server`.

pub mod client;
pub mod curation;
pub mod error;
pub mod m3u;
pub mod models;
pub mod pipeline;
pub mod probe;
pub mod scheduler;
pub mod snapshot;

#[cfg(feature = "pmoconfig")]
pub mod config_ext;

#[cfg(feature = "server")]
pub mod api_rest;

#[cfg(feature = "server")]
pub mod pmoserver_ext;

// Re-exports
pub use client::{ClientBuilder, PlaylistClient};
pub use curation::CurationPolicy;
pub use error::{Error, Result};
pub use m3u::parse_playlist;
pub use models::{ChannelRecord, CuratedRecord, ProbedChannelRecord, Snapshot, StreamStats};
pub use pipeline::{IptvPipeline, IptvSettings, RefreshReport};
pub use probe::{HttpProbe, StreamProbe};
pub use scheduler::BatchScheduler;
pub use snapshot::SnapshotWriter;

#[cfg(feature = "pmoconfig")]
pub use config_ext::IptvConfigExt;

#[cfg(feature = "server")]
pub use pmoserver_ext::IptvExt;
