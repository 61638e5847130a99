use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::CandidateGenerator;
use super::decoder::decode_candidates;
use super::error::GatewayError;
use super::prompt::build_batch_prompt;
use super::types::{CandidatePair, GenUsage, GenerationRequest, GenerationResponse, PromptMessage};
use crate::config::{GenerationConfig, TranslationStyle};
use crate::glossary::Glossary;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// HTTP client for the generation engine's messages endpoint.
pub struct GenerationClient {
    api_key: String,
    model: String,
    max_tokens: u32,
    client: Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(config: &GenerationConfig) -> Self {
        Self::with_base_url(config, API_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(config: &GenerationConfig, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client,
            base_url,
        }
    }

    async fn send(&self, prompt: String) -> Result<GenerationResponse, GatewayError> {
        let req = GenerationRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![PromptMessage {
                role: "user".into(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&req)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            return Err(GatewayError::RateLimited { retry_after_ms });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<GenerationResponse>().await?)
    }
}

impl CandidateGenerator for GenerationClient {
    async fn generate_batch(
        &self,
        texts: &[String],
        glossary: &Glossary,
        style: &TranslationStyle,
    ) -> Result<(Vec<CandidatePair>, GenUsage), GatewayError> {
        let prompt = build_batch_prompt(texts, glossary, style);
        let response = self.send(prompt).await?;
        debug!(
            batch = texts.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "generation call finished"
        );
        let pairs = decode_candidates(&response.text(), texts);
        Ok((pairs, response.usage))
    }
}
