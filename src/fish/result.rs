// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Identification Result types
//!
//! Wire names are camelCase. Every `data` field is optional on the wire so a
//! partially filled model answer still renders with UI defaults.

use serde::{Deserialize, Deserializer, Serialize};

/// Legal classification of keeping a caught fish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalStatus {
    Ok,
    Restricted,
    Prohibited,
    #[default]
    #[serde(other)]
    Unknown,
}

impl LegalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegalStatus::Ok => "OK",
            LegalStatus::Restricted => "RESTRICTED",
            LegalStatus::Prohibited => "PROHIBITED",
            LegalStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Species, regulation and culinary details for one identified fish
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FishData {
    pub fish_name_ja: Option<String>,
    pub fish_name_en: Option<String>,
    pub scientific_name: Option<String>,
    #[serde(deserialize_with = "lenient_status")]
    pub status: LegalStatus,
    pub legal_explanation: Option<String>,
    /// Minimum keepable length in cm; 0 means unrestricted
    #[serde(deserialize_with = "number_or_zero")]
    pub min_size: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub daily_limit: Option<f64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub seasonal_ban: Vec<String>,
    pub is_edible: Option<bool>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub cooking_methods: Vec<String>,
    pub taste: Option<String>,
    pub nutrition: Option<String>,
    pub peak_season: Option<String>,
    pub habitat: Option<String>,
    pub edibility_notes: Option<String>,
    pub preparation_warnings: Option<String>,
    pub regulation_source: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub confidence: Option<String>,
    pub source_url: Option<String>,
}

/// Outcome of submitting an image and location to a backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub from_cache: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<FishData>,
}

impl IdentificationResult {
    /// A successful identification
    pub fn identified(data: FishData, from_cache: bool) -> Self {
        Self {
            success: true,
            error: None,
            message: None,
            from_cache,
            data: Some(data),
        }
    }

    /// A user-facing failure (no fish found, unreadable model output, ...)
    pub fn failure(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            message,
            from_cache: false,
            data: None,
        }
    }
}

/// Render a numeric regulation value without a trailing `.0`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// Null, lowercase or unexpected values all land on a known variant
fn lenient_status<'de, D>(deserializer: D) -> Result<LegalStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => {
            serde_json::from_value(serde_json::Value::String(s.trim().to_uppercase()))
                .unwrap_or_default()
        }
        _ => LegalStatus::Unknown,
    })
}

/// Leading numeric part of a model answer: `15`, `"15"`, `"15cm"`. `"なし"` has none.
fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..end].parse::<f64>().ok()
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_leading_number(&s),
        _ => None,
    })
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or(0.0))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// Models answer `"high"`, `0.92` or `92` interchangeably
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
