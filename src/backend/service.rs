// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VLM-backed identification service
//!
//! Identifies the species on every request, then serves the regulation
//! profile for `(species, prefecture)` from [`RegulationCache`] when it can.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::{CacheStats, RegulationCache};
use super::model::FishVisionModel;
use super::{BackendError, FishBackend};
use crate::fish::{FishData, IdentificationResult};
use crate::vision::{decode_image_bytes, extract_json_block, format_to_extension};

pub const NOT_IDENTIFIED: &str = "魚を特定できませんでした";
pub const IMAGE_UNREADABLE: &str = "画像を読み込めませんでした";
const UNPARSEABLE_REPLY: &str = "AIの応答を解析できませんでした。もう一度お試しください。";
const NO_FISH_FOUND: &str = "画像から魚を見つけられませんでした。魚全体が写った写真を選んでください。";

/// What the identification prompt answers
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SpeciesCandidate {
    found: bool,
    fish_name_ja: Option<String>,
    fish_name_en: Option<String>,
    scientific_name: Option<String>,
    confidence: Option<serde_json::Value>,
    reason: Option<String>,
}

impl SpeciesCandidate {
    /// Most specific non-empty name, used for the cache key and the
    /// regulation prompt
    fn species_key(&self) -> Option<&str> {
        [&self.scientific_name, &self.fish_name_ja, &self.fish_name_en]
            .into_iter()
            .filter_map(|name| name.as_deref())
            .map(str::trim)
            .find(|name| !name.is_empty())
    }

    fn confidence_label(&self) -> Option<String> {
        match self.confidence.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => {
                let value = n.as_f64()?;
                if (0.0..=1.0).contains(&value) {
                    Some(format!("{:.0}%", value * 100.0))
                } else {
                    Some(n.to_string())
                }
            }
            _ => None,
        }
    }

    /// Overlay the identified names onto a regulation profile
    fn apply_to(&self, mut profile: FishData) -> FishData {
        profile.fish_name_ja = self.fish_name_ja.clone().or(profile.fish_name_ja);
        profile.fish_name_en = self.fish_name_en.clone().or(profile.fish_name_en);
        profile.scientific_name = self.scientific_name.clone().or(profile.scientific_name);
        profile.confidence = self.confidence_label().or(profile.confidence);
        profile
    }
}

/// Backend that asks a vision model and caches regulation profiles
pub struct VlmFishBackend {
    model: Arc<dyn FishVisionModel>,
    cache: RegulationCache,
}

impl VlmFishBackend {
    pub fn new(model: Arc<dyn FishVisionModel>, cache: RegulationCache) -> Self {
        Self { model, cache }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[async_trait]
impl FishBackend for VlmFishBackend {
    async fn identify_and_check_fish(
        &self,
        image_bytes: &[u8],
        prefecture: &str,
        city: &str,
    ) -> Result<IdentificationResult, BackendError> {
        let (_image, image_info) = match decode_image_bytes(image_bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Rejected image before identification: {}", e);
                return Ok(IdentificationResult::failure(
                    IMAGE_UNREADABLE,
                    Some(e.to_string()),
                ));
            }
        };

        info!(
            "Identifying fish: image={} ({}x{}, {} bytes), prefecture={}, city={}",
            image_digest(image_bytes),
            image_info.width,
            image_info.height,
            image_info.size_bytes,
            prefecture,
            city
        );

        let encoded = STANDARD.encode(image_bytes);
        let reply = self
            .model
            .identify_species(&encoded, format_to_extension(image_info.format))
            .await?;
        debug!(
            "Identification reply in {}ms ({} tokens)",
            reply.processing_time_ms, reply.tokens_used
        );

        let candidate: SpeciesCandidate = match parse_reply(&reply.content) {
            Some(candidate) => candidate,
            None => {
                warn!("Unparseable identification reply: {}", reply.content);
                return Ok(IdentificationResult::failure(
                    NOT_IDENTIFIED,
                    Some(UNPARSEABLE_REPLY.to_string()),
                ));
            }
        };

        let species = match candidate.species_key() {
            Some(species) if candidate.found => species.to_string(),
            _ => {
                info!("No fish identified");
                return Ok(IdentificationResult::failure(
                    NOT_IDENTIFIED,
                    Some(
                        candidate
                            .reason
                            .clone()
                            .filter(|r| !r.trim().is_empty())
                            .unwrap_or_else(|| NO_FISH_FOUND.to_string()),
                    ),
                ));
            }
        };

        if let Some(profile) = self.cache.get(&species, prefecture) {
            info!("Regulation cache hit: {} @ {}", species, prefecture);
            return Ok(IdentificationResult::identified(
                candidate.apply_to(profile),
                true,
            ));
        }

        let reply = self
            .model
            .regulation_details(&species, prefecture, city)
            .await?;

        let profile: FishData = match parse_reply(&reply.content) {
            Some(profile) => profile,
            None => {
                warn!("Unparseable regulation reply for {}: {}", species, reply.content);
                return Ok(IdentificationResult::failure(
                    NOT_IDENTIFIED,
                    Some(UNPARSEABLE_REPLY.to_string()),
                ));
            }
        };

        self.cache.insert(&species, prefecture, &profile);
        info!("Regulation profile generated: {} @ {}", species, prefecture);

        Ok(IdentificationResult::identified(
            candidate.apply_to(profile),
            false,
        ))
    }

    fn name(&self) -> &'static str {
        "vlm"
    }
}

fn parse_reply<T: for<'de> Deserialize<'de>>(content: &str) -> Option<T> {
    let json = extract_json_block(content)?;
    serde_json::from_str(json).ok()
}

/// Short hex digest identifying an uploaded image in logs
pub fn image_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..6])
}
