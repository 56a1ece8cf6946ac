// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use super::credentials::resolve_credentials_path;

/// Where the vision-language model is served
#[derive(Debug, Clone, PartialEq)]
pub struct VlmConfig {
    /// Base URL of an OpenAI-compatible server
    pub endpoint: String,
    /// Model name sent with each request
    pub model: String,
}

/// Configuration for the web server and identification backend
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// VLM backend; None leaves the backend unavailable
    pub vlm: Option<VlmConfig>,
    /// Regulation cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Maximum cached regulation profiles
    pub cache_max_entries: usize,
    /// Maximum concurrent browser sessions kept in memory
    pub session_capacity: usize,
    /// Vision credentials file (used by the credential probe)
    pub credentials_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            vlm: None,
            cache_ttl_secs: 7 * 24 * 3600,
            cache_max_entries: 1000,
            session_capacity: 1024,
            credentials_path: resolve_credentials_path(|_| None),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let vlm = lookup("VLM_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .map(|endpoint| VlmConfig {
                endpoint,
                model: lookup("VLM_MODEL").unwrap_or_else(|| "qwen3-vl".to_string()),
            });

        Self {
            host: lookup("UO_HOST").unwrap_or(defaults.host),
            port: lookup("UO_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            vlm,
            cache_ttl_secs: lookup("REGULATION_CACHE_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            cache_max_entries: lookup("REGULATION_CACHE_MAX_ENTRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_max_entries),
            session_capacity: lookup("UO_SESSION_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_capacity),
            credentials_path: resolve_credentials_path(&lookup),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_secs == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }
        if self.session_capacity == 0 {
            return Err("Session capacity must be greater than 0".to_string());
        }
        if let Some(ref vlm) = self.vlm {
            let url = url::Url::parse(&vlm.endpoint)
                .map_err(|e| format!("Invalid VLM_ENDPOINT '{}': {}", vlm.endpoint, e))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(format!("VLM_ENDPOINT must be http(s), got '{}'", url.scheme()));
            }
            if vlm.model.trim().is_empty() {
                return Err("VLM_MODEL must not be empty".to_string());
            }
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }
}
