// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server-rendered page flow
//!
//! Every mutation answers `303 See Other` back to `/`, which re-renders
//! from session state. Sessions are tracked with the `uo_session` cookie.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::http_server::AppState;
use crate::ui::{
    apply_outcome, begin_submit, render_page, run_submit, Notice, PageContext, ResultView,
    SubmitPlan, UploadPreview,
};

pub const SESSION_COOKIE: &str = "uo_session";

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub location: String,
}

/// Session id carried by the request's cookie header, if any
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn with_session_cookie(id: Uuid, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

async fn session_id(state: &AppState, headers: &HeaderMap) -> Uuid {
    state.sessions.resolve(session_id_from_headers(headers)).await
}

/// GET /
pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let id = session_id(&state, &headers).await;
    let backend_available = state.backend().await.is_some();

    let html = state
        .sessions
        .with_session(id, |session| {
            let flash = session.take_flash();
            let ctx = PageContext {
                flash: &flash,
                upload: session.uploaded_file.as_ref().map(UploadPreview::from_upload),
                uploader_key: session.uploader_key,
                selected_location: &session.selected_location,
                result: session.fish_result.as_ref().map(ResultView::from_result),
                backend_available,
            };
            render_page(&ctx)
        })
        .await;

    with_session_cookie(id, Html(html))
}

/// POST /upload - multipart field `file`
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let id = session_id(&state, &headers).await;

    let mut upload: Option<(String, Bytes)> = None;
    let mut failure: Option<String> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let name = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((name, bytes)),
                    Err(e) => failure = Some(e.to_string()),
                }
                break;
            }
            Ok(None) => break,
            Err(e) => {
                failure = Some(e.to_string());
                break;
            }
        }
    }

    state
        .sessions
        .with_session(id, |session| match (upload, failure) {
            (_, Some(e)) => {
                warn!("Upload could not be read: {}", e);
                session.uploaded_file = None;
                session.push_notice(Notice::error(format!("読み込みエラー: {}", e)));
            }
            (Some((name, bytes)), None) if !bytes.is_empty() => {
                // decode failures are recorded on the session
                let _ = session.accept_upload(&name, bytes);
            }
            _ => debug!("Upload form submitted without a file"),
        })
        .await;

    with_session_cookie(id, Redirect::to("/"))
}

/// POST /reset - 別の画像を選択
pub async fn reset_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let id = session_id(&state, &headers).await;
    state.sessions.with_session(id, |session| session.reset()).await;
    with_session_cookie(id, Redirect::to("/"))
}

/// POST /submit - 決定
pub async fn submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> Response {
    let id = session_id(&state, &headers).await;
    let backend = state.backend().await;

    let plan = state
        .sessions
        .with_session(id, |session| {
            begin_submit(session, &form.location, backend.is_some())
        })
        .await;

    if let (SubmitPlan::Ready(request), Some(backend)) = (plan, backend) {
        let outcome = run_submit(backend.as_ref(), &request).await;
        state
            .sessions
            .with_session(id, |session| apply_outcome(session, outcome))
            .await;
    }

    with_session_cookie(id, Redirect::to("/"))
}
