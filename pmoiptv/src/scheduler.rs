//! Batched probing with bounded concurrency
//!
//! Channels are split into consecutive groups. A group is probed
//! concurrently and fully joined before the next one starts, with a fixed
//! pause between groups so origin servers are not hammered.

use crate::models::{ChannelRecord, ProbedChannelRecord};
use crate::probe::StreamProbe;
use futures::future::join_all;
use std::time::Duration;
use tracing::debug;

/// Number of probes in flight at once
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Pause between two groups (500 ms)
pub const DEFAULT_BATCH_PACING_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
    pacing: Duration,
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, Duration::from_millis(DEFAULT_BATCH_PACING_MS))
    }
}

impl BatchScheduler {
    /// A batch size of 0 is raised to 1
    pub fn new(batch_size: usize, pacing: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pacing,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Probe every channel, output order equals input order
    ///
    /// `join_all` yields results in the order of its futures, so each outcome
    /// lands in the slot of its own channel whatever the completion order.
    pub async fn run<P>(&self, channels: Vec<ChannelRecord>, probe: &P) -> Vec<ProbedChannelRecord>
    where
        P: StreamProbe + ?Sized,
    {
        let total_batches = channels.len().div_ceil(self.batch_size);
        let mut probed = Vec::with_capacity(channels.len());
        let mut remaining = channels.into_iter().peekable();
        let mut batch = 0;

        while remaining.peek().is_some() {
            batch += 1;
            let group: Vec<ChannelRecord> = remaining.by_ref().take(self.batch_size).collect();

            debug!(batch, total_batches, size = group.len(), "Probing batch");

            let outcomes = join_all(group.iter().map(|channel| probe.probe(&channel.url))).await;

            probed.extend(
                group
                    .into_iter()
                    .zip(outcomes)
                    .map(|(channel, enabled)| channel.probed(enabled)),
            );

            if remaining.peek().is_some() && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        probed
    }
}
