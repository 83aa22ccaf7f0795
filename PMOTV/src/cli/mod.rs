use anyhow::Result;
use clap::{Parser, Subcommand};
use pmoconfig::get_config;
use pmoiptv::{IptvConfigExt, IptvSettings};
use std::path::PathBuf;

mod serve;
mod update;

pub use serve::ServeCommand;
pub use update::UpdateCommand;

#[derive(Parser, Debug)]
#[command(name = "pmotv")]
#[command(about = "Fetch an IPTV playlist, check which streams answer and publish the list")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline once and write the snapshot (default)
    Update(UpdateCommand),
    /// Start the HTTP server exposing the refresh trigger
    Serve(ServeCommand),
}

impl Args {
    pub async fn run(self) -> Result<()> {
        let command = self
            .command
            .unwrap_or(Command::Update(UpdateCommand::default()));

        match command {
            Command::Update(cmd) => cmd.run().await,
            Command::Serve(cmd) => cmd.run().await,
        }
    }
}

/// Overrides shared by every subcommand
#[derive(clap::Args, Debug, Default, Clone)]
pub struct PipelineArgs {
    /// Playlist URL (defaults to `sources.iptv.playlist_url`)
    #[arg(long)]
    pub playlist_url: Option<String>,

    /// Directory receiving streams.json (defaults to `sources.iptv.snapshot.directory`)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl PipelineArgs {
    /// Configuration values with command-line overrides applied
    pub fn settings(&self) -> Result<IptvSettings> {
        let mut settings = get_config().get_iptv_settings()?;

        if let Some(url) = &self.playlist_url {
            settings.playlist_url = url.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.snapshot_directory = dir.clone();
        }

        Ok(settings)
    }
}
