// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod fish;
pub mod ui;
pub mod version;
pub mod vision;

pub use backend::{BackendError, FishBackend, VlmFishBackend};
pub use fish::{prefecture_from_city, FishData, IdentificationResult, LegalStatus};
