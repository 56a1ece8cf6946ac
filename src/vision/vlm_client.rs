// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VLM client for fish identification via an OpenAI-compatible API

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Error)]
pub enum VlmError {
    #[error("VLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("VLM returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("VLM returned no choices")]
    EmptyResponse,
}

/// Raw text answer from one chat completion
#[derive(Debug, Clone)]
pub struct VlmReply {
    pub content: String,
    pub model: String,
    pub processing_time_ms: u64,
    pub tokens_used: u32,
}

/// Client for a VLM service speaking the OpenAI chat-completions protocol
pub struct VlmClient {
    client: Client,
    endpoint: String,
    model_name: String,
}

const IDENTIFY_PROMPT: &str = "You are an ichthyologist. Identify the fish in this photo. \
Answer with a single JSON object and nothing else, using these keys: \
\"found\" (boolean, false if no fish is visible), \
\"fishNameJa\" (Japanese common name in katakana), \
\"fishNameEn\" (English common name), \
\"scientificName\", \
\"confidence\" (number between 0 and 1), \
\"reason\" (short Japanese explanation when found is false).";

const REGULATION_PROMPT_HEADER: &str = "You are an expert on Japanese recreational fishing rules. \
Answer with a single JSON object and nothing else. All text values must be in Japanese. Keys: \
\"status\" (one of \"OK\", \"RESTRICTED\", \"PROHIBITED\"), \
\"legalExplanation\", \
\"minSize\" (minimum keepable length in cm, 0 if none), \
\"dailyLimit\" (number or null), \
\"seasonalBan\" (array of closed periods, empty if none), \
\"isEdible\" (boolean or null), \
\"description\", \"cookingMethods\" (array), \"taste\", \"nutrition\", \"peakSeason\", \
\"habitat\", \"edibilityNotes\", \"preparationWarnings\", \
\"regulationSource\" (name of the rule or authority), \"sourceUrl\" (official URL or null).";

impl VlmClient {
    /// Create a new VLM client
    pub fn new(endpoint: &str, model_name: &str) -> Result<Self, VlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "VLM client configured: endpoint={}, model={}",
            endpoint, model_name
        );

        Ok(Self {
            client,
            endpoint,
            model_name: model_name.to_string(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if the VLM service is healthy
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("VLM health check failed: {}", e);
                false
            }
        }
    }

    /// Ask the VLM which species is in the photo
    pub async fn identify_species(
        &self,
        base64_image: &str,
        format: &str,
    ) -> Result<VlmReply, VlmError> {
        let data_url = format!("data:image/{};base64,{}", format, base64_image);
        let content = serde_json::json!([
            {"type": "text", "text": IDENTIFY_PROMPT},
            {"type": "image_url", "image_url": {"url": data_url}}
        ]);
        self.complete(content, 512, 0.1).await
    }

    /// Ask for the regulation and culinary profile of a species in a prefecture
    pub async fn regulation_details(
        &self,
        species: &str,
        prefecture: &str,
        city: &str,
    ) -> Result<VlmReply, VlmError> {
        let prompt = regulation_prompt(species, prefecture, city);
        self.complete(serde_json::Value::String(prompt), 2048, 0.2)
            .await
    }

    async fn complete(
        &self,
        content: serde_json::Value,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<VlmReply, VlmError> {
        let start = std::time::Instant::now();

        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(VlmError::EmptyResponse)?;
        let tokens_used = chat_response.usage.map(|u| u.total_tokens).unwrap_or(0);

        Ok(VlmReply {
            content,
            model: self.model_name.clone(),
            processing_time_ms: start.elapsed().as_millis() as u64,
            tokens_used,
        })
    }
}

fn regulation_prompt(species: &str, prefecture: &str, city: &str) -> String {
    format!(
        "{}\n\nSpecies: {}\nPrefecture: {}\nFishing spot: {}",
        REGULATION_PROMPT_HEADER, species, prefecture, city
    )
}

/// Pull the JSON object out of a model answer.
///
/// Models wrap JSON in ```json fences or add prose around it; the outermost
/// `{ ... }` span is returned.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
