// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! VLM backend tests against a scripted vision model
//!
//! These tests verify that:
//! - The first lookup for a species and prefecture is generated, the second
//!   is served from the regulation cache
//! - A different prefecture is a separate cache entry
//! - Loosely typed regulation answers still produce a result
//! - Unreadable images and "no fish" answers become failure results
//! - Transport errors propagate as backend errors

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use uo_checker::{
    backend::{BackendError, FishBackend, FishVisionModel, RegulationCache, VlmFishBackend},
    fish::LegalStatus,
    vision::{VlmError, VlmReply},
};

/// Vision model with fixed answers that counts regulation prompts
struct ScriptedModel {
    identify_reply: String,
    regulation_calls: AtomicUsize,
    regulation_reply: Option<String>,
    fail_transport: bool,
}

impl ScriptedModel {
    fn new(identify_reply: &str) -> Self {
        Self {
            identify_reply: identify_reply.to_string(),
            regulation_calls: AtomicUsize::new(0),
            regulation_reply: None,
            fail_transport: false,
        }
    }

    fn reply(content: String) -> VlmReply {
        VlmReply {
            content,
            model: "scripted".to_string(),
            processing_time_ms: 1,
            tokens_used: 10,
        }
    }
}

#[async_trait]
impl FishVisionModel for ScriptedModel {
    async fn identify_species(
        &self,
        _base64_image: &str,
        _format: &str,
    ) -> Result<VlmReply, VlmError> {
        if self.fail_transport {
            return Err(VlmError::Upstream {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(Self::reply(self.identify_reply.clone()))
    }

    async fn regulation_details(
        &self,
        _species: &str,
        prefecture: &str,
        _city: &str,
    ) -> Result<VlmReply, VlmError> {
        self.regulation_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref reply) = self.regulation_reply {
            return Ok(Self::reply(reply.clone()));
        }
        Ok(Self::reply(format!(
            "Here you go:\n```json\n{{\"status\": \"RESTRICTED\", \"legalExplanation\": \"{}では全長15cm未満は再放流\", \"minSize\": 15, \"dailyLimit\": null, \"seasonalBan\": null, \"isEdible\": true, \"cookingMethods\": [\"刺身\", \"塩焼き\"]}}\n```",
            prefecture
        )))
    }
}

const MADAI: &str = r#"{"found": true, "fishNameJa": "マダイ", "fishNameEn": "Red seabream", "scientificName": "Pagrus major", "confidence": 0.92}"#;

fn jpeg_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(16, 16)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

fn backend(model: Arc<ScriptedModel>) -> VlmFishBackend {
    VlmFishBackend::new(model, RegulationCache::new(3600, 100))
}

#[tokio::test]
async fn test_second_lookup_is_served_from_cache() {
    let model = Arc::new(ScriptedModel::new(MADAI));
    let backend = backend(model.clone());
    let image = jpeg_bytes();

    let first = backend
        .identify_and_check_fish(&image, "兵庫県", "神戸")
        .await
        .unwrap();
    assert!(first.success);
    assert!(!first.from_cache);
    let data = first.data.unwrap();
    assert_eq!(data.fish_name_ja.as_deref(), Some("マダイ"));
    assert_eq!(data.status, LegalStatus::Restricted);
    assert_eq!(data.min_size, 15.0);
    assert!(data.seasonal_ban.is_empty());
    assert_eq!(data.confidence.as_deref(), Some("92%"));

    let second = backend
        .identify_and_check_fish(&image, "兵庫県", "姫路")
        .await
        .unwrap();
    assert!(second.success);
    assert!(second.from_cache);
    assert_eq!(second.data.unwrap().cooking_methods, vec!["刺身", "塩焼き"]);

    assert_eq!(model.regulation_calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.cache_stats().total, 1);
}

#[tokio::test]
async fn test_other_prefecture_is_a_separate_entry() {
    let model = Arc::new(ScriptedModel::new(MADAI));
    let backend = backend(model.clone());
    let image = jpeg_bytes();

    backend
        .identify_and_check_fish(&image, "兵庫県", "神戸")
        .await
        .unwrap();
    let other = backend
        .identify_and_check_fish(&image, "大阪府", "大阪")
        .await
        .unwrap();

    assert!(!other.from_cache);
    assert!(other
        .data
        .unwrap()
        .legal_explanation
        .unwrap()
        .starts_with("大阪府"));
    assert_eq!(model.regulation_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_fish_found_is_failure_result() {
    let model = Arc::new(ScriptedModel::new(
        r#"{"found": false, "reason": "魚が写っていません"}"#,
    ));
    let backend = backend(model.clone());

    let result = backend
        .identify_and_check_fish(&jpeg_bytes(), "兵庫県", "神戸")
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.error.is_some());
    assert_eq!(result.message.as_deref(), Some("魚が写っていません"));
    assert!(result.data.is_none());
    assert_eq!(model.regulation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_loosely_typed_regulation_answer_is_kept() {
    let mut model = ScriptedModel::new(MADAI);
    model.regulation_reply = Some(
        r#"{"status": null, "minSize": "15", "dailyLimit": "なし", "legalExplanation": "規制情報なし"}"#
            .to_string(),
    );
    let backend = backend(Arc::new(model));

    let result = backend
        .identify_and_check_fish(&jpeg_bytes(), "兵庫県", "神戸")
        .await
        .unwrap();
    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data.status, LegalStatus::Unknown);
    assert_eq!(data.min_size, 15.0);
    assert_eq!(data.daily_limit, None);
    assert_eq!(data.legal_explanation.as_deref(), Some("規制情報なし"));
    assert_eq!(data.fish_name_ja.as_deref(), Some("マダイ"));
}

#[tokio::test]
async fn test_unreadable_image_is_failure_result() {
    let model = Arc::new(ScriptedModel::new(MADAI));
    let backend = backend(model.clone());

    let result = backend
        .identify_and_check_fish(b"GIF89a not supported", "兵庫県", "神戸")
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(model.regulation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_error_propagates() {
    let mut model = ScriptedModel::new(MADAI);
    model.fail_transport = true;
    let backend = backend(Arc::new(model));

    let err = backend
        .identify_and_check_fish(&jpeg_bytes(), "兵庫県", "神戸")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BackendError::Vlm(VlmError::Upstream { status: 502, .. })
    ));
}
