//! Pipeline orchestration
//!
//! One run chains the stages in a fixed order:
//!
//! 1. fetch and parse the playlist ([`PlaylistClient`])
//! 2. probe every channel in paced batches ([`BatchScheduler`], [`StreamProbe`])
//! 3. filter, project and rank ([`CurationPolicy`])
//! 4. write the snapshot ([`SnapshotWriter`])
//!
//! Only a feed failure, an empty feed or a write failure ends a run with an
//! error. Nothing is written unless every stage succeeded, so a failed run
//! leaves the previous snapshot in place.

use crate::client::{PlaylistClient, DEFAULT_PLAYLIST_URL};
use crate::curation::{CurationPolicy, DEFAULT_DENYLIST, DEFAULT_INSECURE_PREFIX};
use crate::error::{Error, Result};
use crate::models::{CuratedRecord, ProbedChannelRecord, Snapshot, StreamStats};
use crate::probe::{HttpProbe, StreamProbe, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_PROBE_USER_AGENT};
use crate::scheduler::{BatchScheduler, DEFAULT_BATCH_PACING_MS, DEFAULT_BATCH_SIZE};
use crate::snapshot::SnapshotWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Default directory of the snapshot artifact
pub const DEFAULT_SNAPSHOT_DIRECTORY: &str = "data";

/// Everything needed to build a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct IptvSettings {
    pub playlist_url: String,
    pub probe_timeout: Duration,
    pub probe_user_agent: String,
    pub batch_size: usize,
    pub batch_pacing: Duration,
    pub denylist: Vec<String>,
    pub insecure_prefix: String,
    pub snapshot_directory: PathBuf,
}

impl Default for IptvSettings {
    fn default() -> Self {
        Self {
            playlist_url: DEFAULT_PLAYLIST_URL.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            probe_user_agent: DEFAULT_PROBE_USER_AGENT.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pacing: Duration::from_millis(DEFAULT_BATCH_PACING_MS),
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            insecure_prefix: DEFAULT_INSECURE_PREFIX.to_string(),
            snapshot_directory: PathBuf::from(DEFAULT_SNAPSHOT_DIRECTORY),
        }
    }
}

/// Outcome of a successful [`IptvPipeline::refresh`]
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    /// Public location of the artifact, e.g. `/data/streams.json`
    pub file_path: String,
    pub snapshot_path: PathBuf,
    pub stats: StreamStats,
}

/// The channel pipeline
pub struct IptvPipeline {
    client: PlaylistClient,
    probe: Arc<dyn StreamProbe>,
    scheduler: BatchScheduler,
    policy: CurationPolicy,
    writer: SnapshotWriter,
    // Serialises runs so two triggers never interleave their writes
    run_lock: Mutex<()>,
}

impl IptvPipeline {
    pub fn new(
        client: PlaylistClient,
        probe: Arc<dyn StreamProbe>,
        scheduler: BatchScheduler,
        policy: CurationPolicy,
        writer: SnapshotWriter,
    ) -> Self {
        Self {
            client,
            probe,
            scheduler,
            policy,
            writer,
            run_lock: Mutex::new(()),
        }
    }

    /// Build a pipeline probing over HTTP
    pub fn from_settings(settings: &IptvSettings) -> Result<Self> {
        let client = PlaylistClient::builder()
            .playlist_url(settings.playlist_url.clone())
            .build()?;
        let probe = HttpProbe::with_settings(settings.probe_timeout, settings.probe_user_agent.clone())?;

        Ok(Self::new(
            client,
            Arc::new(probe),
            BatchScheduler::new(settings.batch_size, settings.batch_pacing),
            CurationPolicy::new(settings.denylist.iter().cloned(), settings.insecure_prefix.clone()),
            SnapshotWriter::in_directory(&settings.snapshot_directory),
        ))
    }

    /// Replace the prober (test doubles, alternative transports)
    pub fn with_probe(mut self, probe: Arc<dyn StreamProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn client(&self) -> &PlaylistClient {
        &self.client
    }

    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    pub fn policy(&self) -> &CurationPolicy {
        &self.policy
    }

    pub fn writer(&self) -> &SnapshotWriter {
        &self.writer
    }

    /// Fetch, parse and probe
    ///
    /// Fails with [`Error::EmptyFeed`] when no channel could be parsed.
    pub async fn probe_channels(&self) -> Result<Vec<ProbedChannelRecord>> {
        let channels = self.client.fetch_channels().await?;
        if channels.is_empty() {
            warn!(url = %self.client.playlist_url(), "Playlist holds no channel");
            return Err(Error::EmptyFeed);
        }

        info!(
            channels = channels.len(),
            batch_size = self.scheduler.batch_size(),
            "Checking stream availability"
        );

        Ok(self.scheduler.run(channels, self.probe.as_ref()).await)
    }

    /// Fetch, parse, probe and curate without writing anything
    pub async fn check_channels(&self) -> Result<Vec<CuratedRecord>> {
        let probed = self.probe_channels().await?;
        Ok(self.policy.curate(probed))
    }

    /// Full run ending with a new snapshot
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let _guard = self.run_lock.lock().await;

        let result = self.run_refresh().await;
        if let Err(e) = &result {
            error!("Stream refresh failed: {}", e);
        }
        result
    }

    async fn run_refresh(&self) -> Result<RefreshReport> {
        let curated = self.check_channels().await?;
        let (snapshot, snapshot_path) = self.writer.write_records(curated).await?;
        let stats = snapshot.stats();

        info!(
            total = stats.total,
            enabled = stats.enabled,
            disabled = stats.disabled,
            "Stream refresh complete ({}% enabled)",
            stats.enabled_percentage
        );

        Ok(RefreshReport {
            file_path: self.writer.public_path(),
            snapshot_path,
            stats,
        })
    }

    /// Last snapshot written, if any
    pub async fn current_snapshot(&self) -> Result<Option<Snapshot>> {
        self.writer.read().await
    }
}
