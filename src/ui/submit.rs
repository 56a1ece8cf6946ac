// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! The 決定 (submit) action
//!
//! Split in three steps so the session lock is not held while the backend
//! runs: [`begin_submit`] records the picked location and validates inputs
//! against the session, [`run_submit`] calls the backend, [`apply_outcome`]
//! writes the result back.

use bytes::Bytes;
use tracing::{info, warn};

use super::notice::Notice;
use super::session::UiSession;
use crate::backend::FishBackend;
use crate::fish::{is_suggested_city, prefecture_from_city, IdentificationResult};

pub const MISSING_LOCATION: &str = "現在地を選択してください。";
pub const MISSING_IMAGE: &str = "画像をアップロードしてください。";
pub const BACKEND_UNAVAILABLE: &str = "バックエンドが利用できません。VLM_ENDPOINT の設定を確認してください。";

/// Everything the backend call needs, copied out of the session
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub image: Bytes,
    pub image_name: String,
    pub city: String,
    pub prefecture: String,
}

#[derive(Debug, Clone)]
pub enum SubmitPlan {
    /// Submission refused before any backend call
    Blocked(Notice),
    Ready(SubmitRequest),
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Completed(IdentificationResult),
    /// Unexpected backend fault, shown verbatim
    Failed(Vec<Notice>),
}

/// Validate a submission. Location is checked before the image.
pub fn plan_submit(session: &UiSession, selected: &str, backend_available: bool) -> SubmitPlan {
    let city = selected.trim();
    if city.is_empty() || !is_suggested_city(city) {
        return SubmitPlan::Blocked(Notice::warning(MISSING_LOCATION));
    }

    let upload = match session.uploaded_file {
        Some(ref upload) => upload,
        None => return SubmitPlan::Blocked(Notice::warning(MISSING_IMAGE)),
    };

    if !backend_available {
        return SubmitPlan::Blocked(Notice::error(BACKEND_UNAVAILABLE));
    }

    SubmitPlan::Ready(SubmitRequest {
        image: upload.bytes.clone(),
        image_name: upload.name.clone(),
        city: city.to_string(),
        prefecture: prefecture_from_city(city),
    })
}

/// Remember the picked location, then validate. A blocked plan's notice is
/// queued on the session.
pub fn begin_submit(session: &mut UiSession, selected: &str, backend_available: bool) -> SubmitPlan {
    session.selected_location = selected.trim().to_string();
    let plan = plan_submit(session, selected, backend_available);
    if let SubmitPlan::Blocked(ref notice) = plan {
        session.push_notice(notice.clone());
    }
    plan
}

pub async fn run_submit(backend: &dyn FishBackend, request: &SubmitRequest) -> SubmitOutcome {
    info!(
        "Submitting {} for {} ({}) to {} backend",
        request.image_name,
        request.city,
        request.prefecture,
        backend.name()
    );

    match backend
        .identify_and_check_fish(&request.image, &request.prefecture, &request.city)
        .await
    {
        Ok(result) => SubmitOutcome::Completed(result),
        Err(e) => {
            warn!("Backend call failed: {}", e);
            SubmitOutcome::Failed(vec![
                Notice::error(format!("エラーが発生しました: {}", e)),
                Notice::info(format!("詳細: {:?}", e)),
            ])
        }
    }
}

/// Store a completed result, or queue the failure notices. A failure keeps
/// whatever result was shown before.
pub fn apply_outcome(session: &mut UiSession, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Completed(result) => session.fish_result = Some(result),
        SubmitOutcome::Failed(notices) => session.extend_notices(notices),
    }
}
