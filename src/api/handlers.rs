// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::fish::CITY_PREFECTURES;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Name of the configured backend, None when unavailable
    pub backend: Option<String>,
    pub sessions: usize,
    pub uptime_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityInfo {
    pub city: String,
    pub prefecture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitiesResponse {
    pub cities: Vec<CityInfo>,
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.backend().await.map(|b| b.name().to_string());
    let status = if backend.is_some() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: version::VERSION.to_string(),
        backend,
        sessions: state.sessions.len().await,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /v1/cities - picker entries with their prefectures
pub async fn cities_handler() -> Json<CitiesResponse> {
    Json(CitiesResponse {
        cities: CITY_PREFECTURES
            .iter()
            .map(|(city, prefecture)| CityInfo {
                city: city.to_string(),
                prefecture: prefecture.to_string(),
            })
            .collect(),
    })
}
