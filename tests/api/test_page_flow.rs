// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Page flow tests: upload -> choose location -> 決定 -> render
//!
//! Each step posts to the router and follows up with `GET /` carrying the
//! session cookie, the way a browser follows the 303 redirect.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tower::util::ServiceExt; // for `oneshot`
use uo_checker::{
    api::http_server::{create_app, AppState},
    backend::{BackendError, FishBackend},
    fish::{FishData, IdentificationResult, LegalStatus},
    ui::{
        submit::{MISSING_IMAGE, MISSING_LOCATION},
        view::{FROM_CACHE, FRESHLY_GENERATED},
    },
};

const BOUNDARY: &str = "uo-test-boundary";

/// Backend returning a canned result and recording each call
struct StubBackend {
    result: IdentificationResult,
    calls: AtomicUsize,
    last_location: Mutex<Option<(String, String)>>,
}

impl StubBackend {
    fn new(result: IdentificationResult) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_location: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FishBackend for StubBackend {
    async fn identify_and_check_fish(
        &self,
        _image_bytes: &[u8],
        prefecture: &str,
        city: &str,
    ) -> Result<IdentificationResult, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_location.lock().unwrap() = Some((prefecture.to_string(), city.to_string()));
        Ok(self.result.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Backend that always faults
struct BrokenBackend;

#[async_trait]
impl FishBackend for BrokenBackend {
    async fn identify_and_check_fish(
        &self,
        _image_bytes: &[u8],
        _prefecture: &str,
        _city: &str,
    ) -> Result<IdentificationResult, BackendError> {
        Err(BackendError::Internal("upstream exploded".to_string()))
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

fn madai(status: LegalStatus, from_cache: bool) -> IdentificationResult {
    IdentificationResult::identified(
        FishData {
            fish_name_ja: Some("マダイ".to_string()),
            fish_name_en: Some("Red seabream".to_string()),
            scientific_name: Some("Pagrus major".to_string()),
            status,
            legal_explanation: Some("全長15cm未満は再放流".to_string()),
            min_size: 15.0,
            ..Default::default()
        },
        from_cache,
    )
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(8, 8)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn multipart_body(filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn session_cookie(response: &Response) -> String {
    response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Browser-like client holding the session cookie
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new(state: AppState) -> Self {
        Self {
            app: create_app(state),
            cookie: None,
        }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response {
        let builder = match self.cookie {
            Some(ref cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        self.cookie = Some(session_cookie(&response));
        response
    }

    async fn page(&mut self) -> String {
        let response = self
            .send(Request::builder().method(Method::GET).uri("/"), Body::empty())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    async fn upload(&mut self, filename: &str, content_type: &str, bytes: &[u8]) {
        let builder = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        let response = self
            .send(builder, Body::from(multipart_body(filename, content_type, bytes)))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    async fn submit(&mut self, location: &str) {
        let encoded: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("location", location)
            .finish();
        let builder = Request::builder()
            .method(Method::POST)
            .uri("/submit")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        let response = self.send(builder, Body::from(encoded)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    async fn reset(&mut self) {
        let builder = Request::builder().method(Method::POST).uri("/reset");
        let response = self.send(builder, Body::empty()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}

fn state_with(backend: Arc<dyn FishBackend>) -> AppState {
    AppState::new(Some(backend), 16)
}

#[tokio::test]
async fn test_first_visit_sets_cookie_and_renders_uploader() {
    let mut browser = Browser::new(AppState::new_for_test());
    let html = browser.page().await;

    assert!(browser.cookie.as_deref().unwrap().starts_with("uo_session="));
    assert!(html.contains("UOチェッカー"));
    assert!(html.contains("action=\"/upload\""));
    assert!(!html.contains("識別結果"));
}

#[tokio::test]
async fn test_submit_without_location_warns_and_skips_backend() {
    let backend = Arc::new(StubBackend::new(madai(LegalStatus::Ok, false)));
    let mut browser = Browser::new(state_with(backend.clone()));

    browser.upload("tai.png", "image/png", &png_bytes()).await;
    browser.submit("").await;
    let html = browser.page().await;

    assert!(html.contains(MISSING_LOCATION));
    assert!(html.contains("notice notice-warning"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_submit_without_image_warns_and_skips_backend() {
    let backend = Arc::new(StubBackend::new(madai(LegalStatus::Ok, false)));
    let mut browser = Browser::new(state_with(backend.clone()));

    browser.submit("神戸").await;
    let html = browser.page().await;

    assert!(html.contains(MISSING_IMAGE));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_flash_shown_once() {
    let mut browser = Browser::new(AppState::new_for_test());
    browser.submit("").await;

    assert!(browser.page().await.contains(MISSING_LOCATION));
    assert!(!browser.page().await.contains(MISSING_LOCATION));
}

#[tokio::test]
async fn test_upload_submit_render_cycle() {
    let backend = Arc::new(StubBackend::new(madai(LegalStatus::Restricted, false)));
    let mut browser = Browser::new(state_with(backend.clone()));

    browser.upload("tai.png", "image/png", &png_bytes()).await;
    let html = browser.page().await;
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("別の画像を選択"));

    browser.submit("姫路").await;
    assert_eq!(backend.calls(), 1);
    assert_eq!(
        backend.last_location.lock().unwrap().clone(),
        Some(("兵庫県".to_string(), "姫路".to_string()))
    );

    let html = browser.page().await;
    assert!(html.contains("識別結果"));
    assert!(html.contains("マダイ"));
    assert!(html.contains(FRESHLY_GENERATED));
    assert!(!html.contains(FROM_CACHE));
    // RESTRICTED renders the explanation as a warning
    assert!(html.contains("notice notice-warning"));
    assert!(html.contains("<option value=\"姫路\" selected>姫路</option>"));
}

#[tokio::test]
async fn test_cached_result_shows_cache_indicator() {
    let backend = Arc::new(StubBackend::new(madai(LegalStatus::Ok, true)));
    let mut browser = Browser::new(state_with(backend));

    browser.upload("tai.png", "image/png", &png_bytes()).await;
    browser.submit("神戸").await;
    let html = browser.page().await;

    assert!(html.contains(FROM_CACHE));
    assert!(html.contains("notice notice-success"));
}

#[tokio::test]
async fn test_failure_result_has_no_metrics() {
    let result = IdentificationResult::failure(
        "魚を特定できませんでした",
        Some("写真がぼやけています".to_string()),
    );
    let backend = Arc::new(StubBackend::new(result));
    let mut browser = Browser::new(state_with(backend));

    browser.upload("blur.png", "image/png", &png_bytes()).await;
    browser.submit("大阪").await;
    let html = browser.page().await;

    assert!(html.contains("魚を特定できませんでした"));
    assert!(html.contains("写真がぼやけています"));
    assert!(!html.contains("規制情報"));
}

#[tokio::test]
async fn test_corrupt_upload_shows_load_error_and_clears_upload() {
    let mut browser = Browser::new(AppState::new_for_test());

    browser.upload("tai.png", "image/png", &png_bytes()).await;
    browser
        .upload("broken.png", "image/png", b"definitely not a png")
        .await;
    let html = browser.page().await;

    assert!(html.contains("読み込みエラー"));
    assert!(html.contains("action=\"/upload\""));
    assert!(!html.contains("data:image/png;base64,"));
}

#[tokio::test]
async fn test_backend_fault_shows_error_and_detail() {
    let mut browser = Browser::new(state_with(Arc::new(BrokenBackend)));

    browser.upload("tai.png", "image/png", &png_bytes()).await;
    browser.submit("京都").await;
    let html = browser.page().await;

    assert!(html.contains("エラーが発生しました"));
    assert!(html.contains("詳細"));
    assert!(!html.contains("識別結果"));
}

#[tokio::test]
async fn test_reset_clears_upload_and_result() {
    let backend = Arc::new(StubBackend::new(madai(LegalStatus::Ok, false)));
    let mut browser = Browser::new(state_with(backend));

    browser.upload("tai.png", "image/png", &png_bytes()).await;
    browser.submit("神戸").await;
    assert!(browser.page().await.contains("識別結果"));

    browser.reset().await;
    let html = browser.page().await;
    assert!(!html.contains("識別結果"));
    assert!(html.contains("action=\"/upload\""));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let backend: Arc<dyn FishBackend> =
        Arc::new(StubBackend::new(madai(LegalStatus::Ok, false)));
    let state = state_with(backend);

    let mut alice = Browser::new(state.clone());
    let mut bob = Browser::new(state);

    alice.upload("tai.png", "image/png", &png_bytes()).await;
    assert!(alice.page().await.contains("data:image/png;base64,"));
    assert!(!bob.page().await.contains("data:image/png;base64,"));
}
