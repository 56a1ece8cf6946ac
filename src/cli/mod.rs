// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod probe;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{start_server, AppState};
use crate::backend::{FishBackend, RegulationCache, VlmFishBackend};
use crate::config::{AppConfig, VlmConfig};
use crate::fish::CITY_PREFECTURES;
use crate::vision::VlmClient;

/// UO checker CLI
#[derive(Parser, Debug)]
#[command(name = "uo-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Fish identification and fishing-rule checker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve(ServeArgs),

    /// Check that the vision credentials file loads
    ProbeCredentials(probe::ProbeArgs),

    /// List the selectable places and their prefectures
    Cities,
}

/// Arguments for the serve command; unset values come from the environment
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen host
    #[arg(long, env = "UO_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "UO_PORT")]
    pub port: Option<u16>,

    /// OpenAI-compatible VLM base URL
    #[arg(long, env = "VLM_ENDPOINT")]
    pub vlm_endpoint: Option<String>,

    /// VLM model name
    #[arg(long, env = "VLM_MODEL")]
    pub vlm_model: Option<String>,
}

impl ServeArgs {
    /// Layer the flags over an environment-derived config
    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(endpoint) = self.vlm_endpoint.filter(|e| !e.trim().is_empty()) {
            let model = self
                .vlm_model
                .clone()
                .or_else(|| config.vlm.as_ref().map(|v| v.model.clone()))
                .unwrap_or_else(|| "qwen3-vl".to_string());
            config.vlm = Some(VlmConfig { endpoint, model });
        } else if let (Some(model), Some(vlm)) = (self.vlm_model, config.vlm.as_mut()) {
            vlm.model = model;
        }
        config
    }
}

/// Build the VLM-backed identifier, or None when no endpoint is configured.
/// An unreachable endpoint is logged but still wired up.
pub async fn build_backend(config: &AppConfig) -> Result<Option<Arc<dyn FishBackend>>> {
    let Some(ref vlm) = config.vlm else {
        warn!("VLM_ENDPOINT not set; identification is unavailable");
        return Ok(None);
    };

    let client = VlmClient::new(&vlm.endpoint, &vlm.model)
        .map_err(|e| anyhow!("Failed to create VLM client: {}", e))?;
    if !client.health_check().await {
        warn!("VLM endpoint {} is not responding to /health", vlm.endpoint);
    }
    let cache = RegulationCache::new(config.cache_ttl_secs, config.cache_max_entries);
    info!(
        "Fish backend ready: endpoint={} model={} cache_ttl={}s",
        vlm.endpoint, vlm.model, config.cache_ttl_secs
    );
    let backend: Arc<dyn FishBackend> = Arc::new(VlmFishBackend::new(Arc::new(client), cache));
    Ok(Some(backend))
}

/// Validate config, wire the backend and serve until ctrl-c
pub async fn serve(config: AppConfig) -> Result<()> {
    config.validate().map_err(|e| anyhow!(e))?;
    let addr = config.bind_addr().map_err(|e| anyhow!(e))?;

    let backend = build_backend(&config).await?;
    let state = AppState::new(backend, config.session_capacity);
    start_server(state, addr).await
}

/// `city<TAB>prefecture` lines
pub fn city_table() -> String {
    CITY_PREFECTURES
        .iter()
        .map(|(city, prefecture)| format!("{}\t{}\n", city, prefecture))
        .collect()
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => serve(args.apply(AppConfig::from_env())).await,
        Commands::ProbeCredentials(args) => probe::probe_credentials(args),
        Commands::Cities => {
            print!("{}", city_table());
            Ok(())
        }
    }
}
