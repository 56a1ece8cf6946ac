// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Place names offered by the location picker and their prefectures

/// Suggested place names in picker order, paired with the prefecture whose
/// fishing rules apply there
pub const CITY_PREFECTURES: &[(&str, &str)] = &[
    ("神戸", "兵庫県"),
    ("姫路", "兵庫県"),
    ("大阪", "大阪府"),
    ("京都", "京都府"),
    ("奈良", "奈良県"),
    ("和歌山", "和歌山県"),
    ("滋賀", "滋賀県"),
    ("福井", "福井県"),
    ("石川", "石川県"),
    ("富山", "富山県"),
    ("名古屋", "愛知県"),
    ("岐阜", "岐阜県"),
    ("静岡", "静岡県"),
    ("浜松", "静岡県"),
    ("三重", "三重県"),
    ("東京", "東京都"),
    ("横浜", "神奈川県"),
    ("川崎", "神奈川県"),
    ("埼玉", "埼玉県"),
    ("千葉", "千葉県"),
    ("茨城", "茨城県"),
    ("栃木", "栃木県"),
    ("群馬", "群馬県"),
    ("宇都宮", "栃木県"),
    ("水戸", "茨城県"),
    ("高崎", "群馬県"),
    ("仙台", "宮城県"),
    ("福島", "福島県"),
    ("山形", "山形県"),
    ("秋田", "秋田県"),
    ("盛岡", "岩手県"),
    ("青森", "青森県"),
    ("弘前", "青森県"),
    ("八戸", "青森県"),
    ("新潟", "新潟県"),
    ("長野", "長野県"),
    ("松本", "長野県"),
    ("甲府", "山梨県"),
    ("山梨", "山梨県"),
    ("富士吉田", "山梨県"),
    ("静岡市", "静岡県"),
];

/// Place names in picker order
pub fn suggested_cities() -> impl Iterator<Item = &'static str> {
    CITY_PREFECTURES.iter().map(|(city, _)| *city)
}

pub fn is_suggested_city(name: &str) -> bool {
    CITY_PREFECTURES.iter().any(|(city, _)| *city == name.trim())
}

/// Resolve the prefecture for a place name.
///
/// Total over the suggested list. Anything else (including a name that is
/// already a prefecture) is returned trimmed but otherwise unchanged.
pub fn prefecture_from_city(city_name: &str) -> String {
    let name = city_name.trim();
    CITY_PREFECTURES
        .iter()
        .find(|(city, _)| *city == name)
        .map(|(_, prefecture)| prefecture.to_string())
        .unwrap_or_else(|| name.to_string())
}
