// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Identify request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::fish::prefecture_from_city;

/// Base64 of a 10MB image plus headroom
const MAX_ENCODED_SIZE: usize = 14 * 1024 * 1024;

/// Request for species identification and regulation lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
    /// Base64-encoded PNG or JPEG, data URLs accepted
    #[serde(default)]
    pub image: Option<String>,

    /// Place name from the picker
    #[serde(default)]
    pub city: String,
}

impl IdentifyRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let image = self.image.as_deref().unwrap_or("");
        if image.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: "image is required".to_string(),
            });
        }
        if image.len() > MAX_ENCODED_SIZE {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: format!(
                    "image exceeds maximum size of {}MB",
                    MAX_ENCODED_SIZE / (1024 * 1024)
                ),
            });
        }
        if self.city.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "city".to_string(),
                message: "city is required".to_string(),
            });
        }
        Ok(())
    }

    pub fn city(&self) -> &str {
        self.city.trim()
    }

    pub fn prefecture(&self) -> String {
        prefecture_from_city(&self.city)
    }
}
