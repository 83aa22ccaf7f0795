use super::PipelineArgs;
use anyhow::{Context, Result};
use clap::Parser;
use pmoiptv::IptvPipeline;
use pmoserver::{LoggingOptions, init_logging};
use tracing::info;

#[derive(Parser, Debug, Default)]
pub struct UpdateCommand {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl UpdateCommand {
    pub async fn run(self) -> Result<()> {
        init_logging(LoggingOptions::from_config());

        let settings = self.pipeline.settings()?;
        info!(
            playlist = %settings.playlist_url,
            output = %settings.snapshot_directory.display(),
            "Updating stream list"
        );

        let pipeline = IptvPipeline::from_settings(&settings)?;
        let report = pipeline
            .refresh()
            .await
            .context("Failed to generate streams file")?;

        info!(
            "Streams file generated: {} ({} streams, {} enabled, {} disabled, {}% enabled)",
            report.snapshot_path.display(),
            report.stats.total,
            report.stats.enabled,
            report.stats.disabled,
            report.stats.enabled_percentage
        );

        Ok(())
    }
}
