// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cloud vision service-account credentials

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the credentials file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Used when the variable is unset
pub const DEFAULT_CREDENTIALS_FILE: &str = "firebase_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("credentials file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to read credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid credentials: {0}")]
    Invalid(String),
}

/// Service-account key file as issued by the cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    #[serde(rename = "type")]
    pub account_type: String,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountCredentials {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account_type != "service_account" {
            return Err(ConfigError::Invalid(format!(
                "expected type 'service_account', got '{}'",
                self.account_type
            )));
        }
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::Invalid("project_id is empty".to_string()));
        }
        if !self.client_email.contains('@') {
            return Err(ConfigError::Invalid(format!(
                "client_email '{}' is not an email address",
                self.client_email
            )));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(ConfigError::Invalid(
                "private_key is not a PEM private key".to_string(),
            ));
        }
        url::Url::parse(&self.token_uri)
            .map_err(|e| ConfigError::Invalid(format!("token_uri: {}", e)))?;
        Ok(())
    }
}

/// Resolve the credentials path from a key lookup, falling back to
/// [`DEFAULT_CREDENTIALS_FILE`]
pub fn resolve_credentials_path<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CREDENTIALS_ENV)
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE))
}

/// Read, parse and validate a service-account key file
pub fn load_credentials(path: &Path) -> Result<ServiceAccountCredentials, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let credentials: ServiceAccountCredentials = serde_json::from_str(&raw)?;
    credentials.validate()?;
    Ok(credentials)
}
