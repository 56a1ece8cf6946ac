// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Router, shared state and server startup

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{cities_handler, health_handler};
use super::identify::identify_handler;
use super::pages::{index_handler, reset_handler, submit_handler, upload_handler};
use crate::backend::FishBackend;
use crate::ui::SessionStore;
use crate::vision::MAX_IMAGE_SIZE;

/// Multipart and base64 overhead on top of the raw image limit
const BODY_LIMIT: usize = MAX_IMAGE_SIZE * 2;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<RwLock<Option<Arc<dyn FishBackend>>>>,
    pub sessions: Arc<SessionStore>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(backend: Option<Arc<dyn FishBackend>>, session_capacity: usize) -> Self {
        Self {
            backend: Arc::new(RwLock::new(backend)),
            sessions: Arc::new(SessionStore::new(session_capacity)),
            started_at: Utc::now(),
        }
    }

    /// State without a backend
    pub fn new_for_test() -> Self {
        Self::new(None, 16)
    }

    pub async fn backend(&self) -> Option<Arc<dyn FishBackend>> {
        self.backend.read().await.clone()
    }

    pub async fn set_backend(&self, backend: Arc<dyn FishBackend>) {
        *self.backend.write().await = Some(backend);
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Page flow
        .route("/", get(index_handler))
        .route("/upload", post(upload_handler))
        .route("/reset", post(reset_handler))
        .route("/submit", post(submit_handler))
        // JSON API
        .route("/health", get(health_handler))
        .route("/v1/cities", get(cities_handler))
        .route("/v1/identify", post(identify_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("UO checker listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
