// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cloud Vision annotator client, instantiated from service-account credentials

use std::path::Path;
use tracing::info;

use crate::config::{load_credentials, ConfigError, ServiceAccountCredentials};

const ANNOTATE_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Image annotator client bound to one service account
pub struct CloudVisionClient {
    credentials: ServiceAccountCredentials,
}

impl CloudVisionClient {
    /// Build a client from already-loaded credentials
    pub fn new(credentials: ServiceAccountCredentials) -> Result<Self, ConfigError> {
        credentials.validate()?;

        info!(
            "Cloud Vision client configured: project={}, account={}",
            credentials.project_id, credentials.client_email
        );

        Ok(Self { credentials })
    }

    /// Load the key file at `path` and build a client
    pub fn from_credentials_file(path: &Path) -> Result<Self, ConfigError> {
        Self::new(load_credentials(path)?)
    }

    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    pub fn endpoint(&self) -> &'static str {
        ANNOTATE_ENDPOINT
    }
}
