// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the UO checker

/// Full version string with feature description
pub const VERSION: &str = "v1.2.0-regulation-cache-2026-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.2.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("UO Checker {} ({})", VERSION_NUMBER, BUILD_DATE)
}
