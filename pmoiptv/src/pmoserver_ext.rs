//! Extension pmoserver pour la source IPTV
//!
//! `pmoiptv` ajoute ses routes à `pmoserver::Server` via un trait, sans que
//! `pmoserver` dépende de `pmoiptv`.
//!
//! ```rust,no_run
//! use pmoiptv::IptvExt;
//! use pmoserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_iptv_configured().await?;
//!     server.start().await;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

use crate::api_rest::{create_router, IptvApiDoc, IptvState};
use crate::config_ext::IptvConfigExt;
use crate::pipeline::IptvPipeline;
use anyhow::Result;
use pmoserver::Server;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

/// Trait pour étendre pmoserver avec l'API IPTV
pub trait IptvExt {
    /// Enregistre l'API IPTV pour un pipeline déjà construit
    ///
    /// # Routes enregistrées
    ///
    /// - `GET /api/iptv/refresh` - Régénère le snapshot
    /// - `GET /api/iptv/streams` - Dernier snapshot
    /// - `/swagger-ui/iptv` - Documentation
    async fn init_iptv(&mut self, pipeline: Arc<IptvPipeline>) -> Result<IptvState>;

    /// Construit le pipeline depuis `sources.iptv` puis enregistre l'API
    async fn init_iptv_configured(&mut self) -> Result<IptvState>;
}

impl IptvExt for Server {
    async fn init_iptv(&mut self, pipeline: Arc<IptvPipeline>) -> Result<IptvState> {
        info!("Initializing IPTV API...");

        let router = create_router(pipeline.clone());
        self.add_openapi(router, IptvApiDoc::openapi(), "iptv").await;

        info!(
            snapshot = %pipeline.writer().path().display(),
            "IPTV API registered at /api/iptv, Swagger UI at /swagger-ui/iptv"
        );

        Ok(pipeline)
    }

    async fn init_iptv_configured(&mut self) -> Result<IptvState> {
        let settings = pmoconfig::get_config().get_iptv_settings()?;
        let pipeline = IptvPipeline::from_settings(&settings)
            .map_err(|e| anyhow::anyhow!("Failed to create IPTV pipeline: {}", e))?;

        self.init_iptv(Arc::new(pipeline)).await
    }
}
