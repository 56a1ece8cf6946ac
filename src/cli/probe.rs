// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::{resolve_credentials_path, CREDENTIALS_ENV};
use crate::vision::CloudVisionClient;

/// Arguments for probe-credentials command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Service-account key file (defaults to GOOGLE_APPLICATION_CREDENTIALS,
    /// then firebase_config.json)
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

/// Load `.env`, resolve the key file and build a vision client from it
pub fn probe_credentials(args: ProbeArgs) -> Result<()> {
    // A missing .env is fine; the process environment may already be set
    dotenv::dotenv().ok();

    let path = args
        .credentials
        .unwrap_or_else(|| resolve_credentials_path(|key| std::env::var(key).ok()));
    info!("Probing vision credentials at {} ({})", path.display(), CREDENTIALS_ENV);

    let client = CloudVisionClient::from_credentials_file(&path)
        .with_context(|| format!("Failed to create vision client from {}", path.display()))?;

    println!("✅ Vision API credentials loaded successfully!");
    println!("   Project: {}", client.project_id());
    println!("   Account: {}", client.client_email());
    println!("   Endpoint: {}", client.endpoint());
    Ok(())
}
