//! HTTP surface.
//!
//! - `token` - password-grant token endpoint (/api/auth)
//! - `health` - health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration, served by Redoc at /api-docs

pub mod health;
pub mod openapi;
pub mod token;

use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

use crate::issuer::TokenIssuer;
use crate::service::TokenExchangeService;

pub use health::MISC_TAG;

pub const AUTH_TAG: &str = "Auth";

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<TokenExchangeService>,
    pub issuer: Arc<dyn TokenIssuer>,
    /// Cancelled on shutdown; each request runs under a child token.
    pub shutdown: CancellationToken,
}

/// Builds the full application router, docs included.
pub fn app(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest(
            "/api",
            OpenApiRouter::new()
                .routes(routes!(token::token))
                .with_state(state),
        )
        .routes(routes!(health::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Serves the application until `state.shutdown` is cancelled.
#[tracing::instrument(skip(state))]
pub async fn start_webserver(state: AppState, listen_addr: &str) -> color_eyre::Result<()> {
    let shutdown = state.shutdown.clone();
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = listen_addr, "Server running");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
