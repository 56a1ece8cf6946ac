// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/identify tests
//!
//! These tests verify that:
//! - Missing image or city is rejected with a validation error
//! - Bad base64 is rejected before the backend is touched
//! - No backend gives 503, a faulting backend gives 500
//! - A configured backend receives the resolved prefecture

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for `oneshot`
use uo_checker::{
    api::http_server::{create_app, AppState},
    api::ErrorResponse,
    backend::{BackendError, FishBackend},
    fish::{FishData, IdentificationResult, LegalStatus},
};

/// Echoes the location it was asked about
#[derive(Default)]
struct RecordingBackend {
    seen: Mutex<Vec<(usize, String, String)>>,
}

#[async_trait]
impl FishBackend for RecordingBackend {
    async fn identify_and_check_fish(
        &self,
        image_bytes: &[u8],
        prefecture: &str,
        city: &str,
    ) -> Result<IdentificationResult, BackendError> {
        self.seen.lock().unwrap().push((
            image_bytes.len(),
            prefecture.to_string(),
            city.to_string(),
        ));
        Ok(IdentificationResult::identified(
            FishData {
                fish_name_ja: Some("カサゴ".to_string()),
                status: LegalStatus::Ok,
                ..Default::default()
            },
            false,
        ))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct FaultyBackend;

#[async_trait]
impl FishBackend for FaultyBackend {
    async fn identify_and_check_fish(
        &self,
        _image_bytes: &[u8],
        _prefecture: &str,
        _city: &str,
    ) -> Result<IdentificationResult, BackendError> {
        Err(BackendError::Internal("model offline".to_string()))
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}

async fn post_identify(state: AppState, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/identify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    create_app(state).oneshot(request).await.unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn image_b64() -> String {
    STANDARD.encode(b"\x89PNG\r\n\x1a\nfake")
}

#[tokio::test]
async fn test_missing_image_is_validation_error() {
    let response = post_identify(AppState::new_for_test(), json!({ "city": "神戸" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.error_type, "validation_error");
    assert_eq!(error.details.unwrap()["field"], "image");
}

#[tokio::test]
async fn test_missing_city_is_validation_error() {
    let response = post_identify(
        AppState::new_for_test(),
        json!({ "image": image_b64(), "city": "  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.details.unwrap()["field"], "city");
}

#[tokio::test]
async fn test_bad_base64_is_invalid_image() {
    let backend = Arc::new(RecordingBackend::default());
    let state = AppState::new(Some(backend.clone()), 4);
    let response = post_identify(state, json!({ "image": "%%%not-base64%%%", "city": "神戸" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.error_type, "invalid_image");
    assert!(backend.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_backend_is_service_unavailable() {
    let response = post_identify(
        AppState::new_for_test(),
        json!({ "image": image_b64(), "city": "神戸" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.error_type, "service_unavailable");
}

#[tokio::test]
async fn test_backend_fault_is_internal_error() {
    let state = AppState::new(Some(Arc::new(FaultyBackend)), 4);
    let response = post_identify(state, json!({ "image": image_b64(), "city": "神戸" })).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorResponse = json_body(response).await;
    assert!(error.message.contains("model offline"));
}

#[tokio::test]
async fn test_identify_resolves_prefecture() {
    let backend = Arc::new(RecordingBackend::default());
    let state = AppState::new(Some(backend.clone()), 4);
    let response = post_identify(state, json!({ "image": image_b64(), "city": "名古屋" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["fromCache"], false);
    assert_eq!(body["data"]["fishNameJa"], "カサゴ");
    assert_eq!(body["data"]["status"], "OK");

    let seen = backend.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, "愛知県");
    assert_eq!(seen[0].2, "名古屋");
}

#[tokio::test]
async fn test_identify_accepts_data_url_and_unlisted_city() {
    let backend = Arc::new(RecordingBackend::default());
    let state = AppState::new(Some(backend.clone()), 4);
    let image = format!("data:image/png;base64,{}", image_b64());
    let response = post_identify(state, json!({ "image": image, "city": "札幌" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let seen = backend.seen.lock().unwrap();
    assert_eq!(seen[0].0, 12);
    assert_eq!(seen[0].1, "札幌");
}
