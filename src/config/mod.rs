// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process configuration loaded from the environment (and `.env`)

pub mod app;
pub mod credentials;

pub use app::{AppConfig, VlmConfig};
pub use credentials::{
    load_credentials, resolve_credentials_path, ConfigError, ServiceAccountCredentials,
    CREDENTIALS_ENV, DEFAULT_CREDENTIALS_FILE,
};
