//! Endpoints API REST pour la source IPTV
//!
//! ## Routes (relatives à `/api/iptv`)
//!
//! - `GET /refresh` - Relance tout le pipeline et réécrit le snapshot
//! - `GET /streams` - Retourne le dernier snapshot écrit

use crate::error::Error;
use crate::models::{CuratedRecord, Snapshot, StreamStats};
use crate::pipeline::IptvPipeline;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Message renvoyé après un rafraîchissement réussi
pub const REFRESH_SUCCESS_MESSAGE: &str = "Streams file generated successfully";

/// État partagé des handlers IPTV
pub type IptvState = Arc<IptvPipeline>;

/// Résumé d'un rafraîchissement
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    /// Emplacement du snapshot écrit
    pub file_path: String,
    pub stats: StreamStats,
}

/// Message d'erreur
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// ============ Gestion des erreurs ============

enum AppError {
    NotFound(&'static str),
    Internal(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            AppError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };

        let body = Json(ErrorResponse {
            error: message.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::EmptyFeed => AppError::NotFound("No streams found"),
            _ => AppError::Internal("Failed to generate streams file"),
        }
    }
}

/// Crée le router pour l'API IPTV
pub fn create_router(state: IptvState) -> Router {
    Router::new()
        .route("/refresh", get(refresh_streams))
        .route("/streams", get(get_streams))
        .with_state(state)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Relance le pipeline complet
///
/// Récupère la playlist, sonde chaque flux, filtre et trie, puis réécrit le
/// snapshot. L'appel est synchrone : la réponse arrive à la fin du run.
#[utoipa::path(
    get,
    path = "/refresh",
    responses(
        (status = 200, description = "Snapshot régénéré", body = RefreshResponse),
        (status = 404, description = "Playlist vide", body = ErrorResponse),
        (status = 500, description = "Échec du téléchargement ou de l'écriture", body = ErrorResponse),
    ),
    tag = "iptv"
)]
async fn refresh_streams(State(pipeline): State<IptvState>) -> Result<Json<RefreshResponse>, AppError> {
    let report = pipeline.refresh().await?;

    Ok(Json(RefreshResponse {
        success: true,
        message: REFRESH_SUCCESS_MESSAGE.to_string(),
        file_path: report.file_path,
        stats: report.stats,
    }))
}

/// Retourne le dernier snapshot
#[utoipa::path(
    get,
    path = "/streams",
    responses(
        (status = 200, description = "Dernier snapshot", body = Snapshot),
        (status = 404, description = "Aucun snapshot écrit", body = ErrorResponse),
        (status = 500, description = "Snapshot illisible", body = ErrorResponse),
    ),
    tag = "iptv"
)]
async fn get_streams(State(pipeline): State<IptvState>) -> Result<Json<Snapshot>, AppError> {
    match pipeline.current_snapshot().await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err(AppError::NotFound("No streams file available")),
        Err(e) => {
            error!("Failed to read streams file: {}", e);
            Err(AppError::Internal("Failed to read streams file"))
        }
    }
}

/// Documentation OpenAPI de l'API IPTV
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(refresh_streams, get_streams),
    components(schemas(RefreshResponse, ErrorResponse, StreamStats, Snapshot, CuratedRecord)),
    tags(
        (name = "iptv", description = "Liste des chaînes IPTV et vérification des flux")
    )
)]
pub struct IptvApiDoc;
