//! Router assembly and the serve loop

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use fakearr_core::config::FakearrConfig;
use fakearr_core::{ArtifactSynthesizer, FakearrError, NewznabIndexer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, newznab_api, not_found, serve_artifact};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub synthesizer: Arc<ArtifactSynthesizer>,
    pub newznab: Arc<NewznabIndexer>,
}

impl AppState {
    /// Builds handler state from configuration.
    ///
    /// # Errors
    /// - `FakearrError::Configuration` - Configuration is inconsistent
    /// - `FakearrError::Hash` - The hash source failed its self-check
    pub fn from_config(config: &FakearrConfig) -> Result<Self, FakearrError> {
        Ok(Self {
            synthesizer: Arc::new(ArtifactSynthesizer::from_config(config)?),
            newznab: Arc::new(NewznabIndexer::new(config.newznab.clone())),
        })
    }
}

/// Builds the application router.
///
/// `/health` and `/api` are matched first; every other `GET` path is treated
/// as an artifact request.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(newznab_api))
        .route("/{*path}", get(serve_artifact))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
/// - `FakearrError::Configuration` / `FakearrError::Hash` - Startup checks failed
/// - `FakearrError::Io` - The listener could not be bound or the server failed
pub async fn run_server(config: FakearrConfig) -> Result<(), FakearrError> {
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!("Fakearr running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Fakearr stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_health() {
        let state = AppState::from_config(&FakearrConfig::for_testing()).unwrap();
        let response = build_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_only_get_is_served() {
        let state = AppState::from_config(&FakearrConfig::for_testing()).unwrap();
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/show.torrent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_invalid_config_fails_startup() {
        let mut config = FakearrConfig::for_testing();
        config.torrent.piece_length = 0;
        assert!(AppState::from_config(&config).is_err());
    }
}
