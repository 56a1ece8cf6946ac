// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Identification backend
//!
//! The UI talks to a [`FishBackend`]. User-facing failures come back as
//! `IdentificationResult { success: false, .. }`; only unexpected faults
//! are returned as [`BackendError`].

pub mod cache;
pub mod model;
pub mod service;

use async_trait::async_trait;
use thiserror::Error;

use crate::fish::IdentificationResult;
use crate::vision::VlmError;

pub use cache::{CacheStats, RegulationCache};
pub use model::FishVisionModel;
pub use service::VlmFishBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Vlm(#[from] VlmError),

    #[error("internal backend error: {0}")]
    Internal(String),
}

/// Identifies the fish in a photo and checks local catch rules
#[async_trait]
pub trait FishBackend: Send + Sync {
    async fn identify_and_check_fish(
        &self,
        image_bytes: &[u8],
        prefecture: &str,
        city: &str,
    ) -> Result<IdentificationResult, BackendError>;

    /// Backend name for logging and health output
    fn name(&self) -> &'static str;
}
