// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fish identification domain types
//!
//! - `result`: the Identification Result produced by a backend and consumed
//!   read-only by the UI
//! - `location`: the fixed place-name list and prefecture lookup

pub mod location;
pub mod result;

pub use location::{is_suggested_city, prefecture_from_city, suggested_cities, CITY_PREFECTURES};
pub use result::{format_number, FishData, IdentificationResult, LegalStatus};
