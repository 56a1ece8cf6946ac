// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use std::env;
use uo_checker::{cli, config::AppConfig, version};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🐟 Starting {}...", version::get_version_string());

    let config = AppConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    match config.vlm {
        Some(ref vlm) => println!("🧠 VLM backend: {} ({})", vlm.endpoint, vlm.model),
        None => println!("⚠️  VLM_ENDPOINT not set, identification disabled"),
    }
    println!("🌐 Listening on http://{}:{}", config.host, config.port);
    println!();

    cli::serve(config).await
}
