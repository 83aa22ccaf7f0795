use super::PipelineArgs;
use anyhow::Result;
use clap::Parser;
use pmoiptv::{IptvExt, IptvPipeline};
use pmoserver::{LoggingOptions, ServerBuilder};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug, Default)]
pub struct ServeCommand {
    /// HTTP port (defaults to `host.http_port`)
    #[arg(short, long)]
    pub port: Option<u16>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl ServeCommand {
    pub async fn run(self) -> Result<()> {
        let mut builder = ServerBuilder::new_configured();
        if let Some(port) = self.port {
            builder = builder.http_port(port);
        }
        let mut server = builder.build();

        server.init_logging(LoggingOptions::from_config()).await;

        let settings = self.pipeline.settings()?;
        let pipeline = Arc::new(IptvPipeline::from_settings(&settings)?);
        server.init_iptv(pipeline).await?;

        server
            .add_route("/info", || async {
                serde_json::json!({"name": "PMOTV", "version": env!("CARGO_PKG_VERSION")})
            })
            .await;

        let info = server.info();
        info!(
            "Trigger a refresh with GET http://{}:{}/api/iptv/refresh",
            info.base_url, info.http_port
        );

        server.start().await;
        server.wait().await;
        Ok(())
    }
}
