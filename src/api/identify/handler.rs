// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Identify endpoint handler

use axum::{extract::State, Json};
use tracing::{error, info};

use super::request::IdentifyRequest;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::fish::IdentificationResult;
use crate::vision::decode_base64_payload;

/// POST /v1/identify - Identify a fish and look up local rules
///
/// Model-level failures (no fish found, unreadable reply) are returned as
/// `200` with `success: false`, the same shape the page renders.
pub async fn identify_handler(
    State(state): State<AppState>,
    Json(request): Json<IdentifyRequest>,
) -> Result<Json<IdentificationResult>, ApiError> {
    request.validate()?;

    let image = decode_base64_payload(request.image.as_deref().unwrap_or(""))
        .map_err(|e| ApiError::InvalidImage(e.to_string()))?;

    let backend = state
        .backend()
        .await
        .ok_or_else(|| ApiError::ServiceUnavailable("fish backend not configured".to_string()))?;

    let prefecture = request.prefecture();
    info!(
        "Identify request: city={} prefecture={} bytes={}",
        request.city(),
        prefecture,
        image.len()
    );

    let result = backend
        .identify_and_check_fish(&image, &prefecture, request.city())
        .await
        .map_err(|e| {
            error!("Backend failed: {}", e);
            ApiError::InternalError(e.to_string())
        })?;

    Ok(Json(result))
}
