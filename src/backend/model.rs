// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model seam used by the identification service

use async_trait::async_trait;

use crate::vision::{VlmClient, VlmError, VlmReply};

/// A model that can name a fish from a photo and describe its catch rules
#[async_trait]
pub trait FishVisionModel: Send + Sync {
    /// Identify the species in a base64-encoded image
    async fn identify_species(&self, base64_image: &str, format: &str)
        -> Result<VlmReply, VlmError>;

    /// Regulation and culinary profile for a species at a location
    async fn regulation_details(
        &self,
        species: &str,
        prefecture: &str,
        city: &str,
    ) -> Result<VlmReply, VlmError>;
}

#[async_trait]
impl FishVisionModel for VlmClient {
    async fn identify_species(
        &self,
        base64_image: &str,
        format: &str,
    ) -> Result<VlmReply, VlmError> {
        VlmClient::identify_species(self, base64_image, format).await
    }

    async fn regulation_details(
        &self,
        species: &str,
        prefecture: &str,
        city: &str,
    ) -> Result<VlmReply, VlmError> {
        VlmClient::regulation_details(self, species, prefecture, city).await
    }
}
