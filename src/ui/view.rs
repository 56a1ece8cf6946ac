// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! View model for the 識別結果 (result) panel

use super::notice::{Notice, NoticeLevel};
use crate::fish::{format_number, FishData, IdentificationResult, LegalStatus};

pub const DEFAULT_FAILURE: &str = "魚を特定できませんでした";
pub const FROM_CACHE: &str = "キャッシュから取得（高速）";
pub const FRESHLY_GENERATED: &str = "AIが新しく生成しました";
const NO_LIMIT: &str = "制限なし";
const UNKNOWN: &str = "不明";

/// One headline regulation value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

/// One entry of the expandable details section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailItem {
    pub label: &'static str,
    pub text: String,
    /// Rendered as a leveled notice instead of plain text
    pub level: Option<NoticeLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedView {
    pub cache_notice: Notice,
    pub heading: String,
    pub scientific_caption: Option<String>,
    pub legal_notice: Notice,
    pub metrics: Vec<Metric>,
    pub details: Vec<DetailItem>,
    pub source_caption: String,
    pub confidence_caption: String,
    /// Only http(s) links are kept
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Failure {
        error: Notice,
        message: Option<Notice>,
    },
    Identified(Box<IdentifiedView>),
}

impl ResultView {
    pub fn from_result(result: &IdentificationResult) -> Self {
        if !result.success {
            return ResultView::Failure {
                error: Notice::error(
                    non_empty(result.error.as_deref()).unwrap_or(DEFAULT_FAILURE),
                ),
                message: result.message.as_deref().map(Notice::info),
            };
        }

        let default_data = FishData::default();
        let data = result.data.as_ref().unwrap_or(&default_data);

        let cache_notice = if result.from_cache {
            Notice::info(FROM_CACHE)
        } else {
            Notice::info(FRESHLY_GENERATED)
        };

        let heading = format!(
            "{} ({})",
            non_empty(data.fish_name_ja.as_deref()).unwrap_or(UNKNOWN),
            non_empty(data.fish_name_en.as_deref()).unwrap_or("Unknown")
        );

        let explanation = non_empty(data.legal_explanation.as_deref()).unwrap_or("情報なし");
        let legal_notice = Notice::new(status_level(data.status), explanation);

        ResultView::Identified(Box::new(IdentifiedView {
            cache_notice,
            heading,
            scientific_caption: non_empty(data.scientific_name.as_deref())
                .map(|name| format!("学名: {}", name)),
            legal_notice,
            metrics: metrics(data),
            details: details(data),
            source_caption: format!(
                "情報源: {}",
                non_empty(data.regulation_source.as_deref()).unwrap_or(UNKNOWN)
            ),
            confidence_caption: format!(
                "信頼度: {}",
                non_empty(data.confidence.as_deref()).unwrap_or(UNKNOWN)
            ),
            source_url: safe_link(data.source_url.as_deref()),
        }))
    }

    /// Every leveled notice in display order
    pub fn notices(&self) -> Vec<&Notice> {
        match self {
            ResultView::Failure { error, message } => {
                std::iter::once(error).chain(message.iter()).collect()
            }
            ResultView::Identified(view) => vec![&view.cache_notice, &view.legal_notice],
        }
    }
}

/// Severity used to present a legal status
pub fn status_level(status: LegalStatus) -> NoticeLevel {
    match status {
        LegalStatus::Ok => NoticeLevel::Success,
        LegalStatus::Restricted => NoticeLevel::Warning,
        LegalStatus::Prohibited => NoticeLevel::Error,
        LegalStatus::Unknown => NoticeLevel::Info,
    }
}

fn metrics(data: &FishData) -> Vec<Metric> {
    let min_size = if data.min_size > 0.0 {
        format!("{}cm", format_number(data.min_size))
    } else {
        NO_LIMIT.to_string()
    };

    let daily_limit = match data.daily_limit {
        Some(limit) if limit != 0.0 => format!("{}尾", format_number(limit)),
        _ => NO_LIMIT.to_string(),
    };

    let seasonal_ban = if data.seasonal_ban.is_empty() {
        "なし".to_string()
    } else {
        data.seasonal_ban.join(", ")
    };

    let edible = match data.is_edible {
        Some(true) => "可能",
        Some(false) => "不可",
        None => UNKNOWN,
    };

    vec![
        Metric {
            label: "最小サイズ",
            value: min_size,
        },
        Metric {
            label: "1日の漁獲量",
            value: daily_limit,
        },
        Metric {
            label: "禁漁期",
            value: seasonal_ban,
        },
        Metric {
            label: "食用",
            value: edible.to_string(),
        },
    ]
}

fn details(data: &FishData) -> Vec<DetailItem> {
    let cooking = (!data.cooking_methods.is_empty()).then(|| data.cooking_methods.join(", "));

    let entries: [(&'static str, Option<&str>, Option<NoticeLevel>); 8] = [
        ("説明", data.description.as_deref(), None),
        ("調理法", cooking.as_deref(), None),
        ("味", data.taste.as_deref(), None),
        ("栄養", data.nutrition.as_deref(), None),
        ("旬", data.peak_season.as_deref(), None),
        ("生息地", data.habitat.as_deref(), None),
        ("食用に関する注意", data.edibility_notes.as_deref(), None),
        (
            "調理時の注意",
            data.preparation_warnings.as_deref(),
            Some(NoticeLevel::Warning),
        ),
    ];

    entries
        .into_iter()
        .filter_map(|(label, text, level)| {
            non_empty(text).map(|text| DetailItem {
                label,
                text: text.to_string(),
                level,
            })
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn safe_link(value: Option<&str>) -> Option<String> {
    let url = url::Url::parse(non_empty(value)?.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
