//! OpenAI-compatible adapter.
//!
//! Works with OpenAI and any provider using the OpenAI chat completions
//! API format with `json_schema` structured outputs.
//! Uses browser `fetch()` via gloo-net for WASM compatibility.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::{json, Value};

use persona_core::ports::*;
use persona_types::{config::LlmConfig, PersonaError, Result};

use super::errors::{classify_http_failure, network_failure};

/// Provider that speaks the OpenAI chat completions protocol.
pub struct OpenAiCompatProvider {
    config: LlmConfig,
    base_url: String,
}

impl OpenAiCompatProvider {
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config.base_url();
        Self { config, base_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

pub fn build_request_body(req: &GenerationRequest) -> Value {
    json!({
        "model": req.model,
        "messages": [
            { "role": "user", "content": req.prompt },
        ],
        "temperature": req.temperature,
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": req.schema_name,
                "strict": true,
                "schema": req.schema,
            },
        },
    })
}

/// Content of the first choice.
pub fn extract_text(data: ApiResponse) -> Result<GenerationResponse> {
    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| PersonaError::ResponseParse("No choices in response".to_string()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(PersonaError::ResponseParse(format!("model refused: {}", refusal)));
    }

    let text = choice.message.content.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(PersonaError::ResponseParse("Empty message content".to_string()));
    }

    let usage = data.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
    });

    Ok(GenerationResponse { text, usage })
}

#[async_trait(?Send)]
impl GenerationPort for OpenAiCompatProvider {
    async fn generate_content(&self, req: GenerationRequest) -> Result<GenerationResponse> {
        let api_key = self.config.credential()?;
        if self.base_url.is_empty() {
            return Err(PersonaError::Transport("No API base URL configured".to_string()));
        }

        let url = self.endpoint();
        let body = build_request_body(&req);

        let response = Request::post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", api_key))
            .json(&body)
            .map_err(network_failure)?
            .send()
            .await
            .map_err(network_failure)?;

        if !response.ok() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            log::warn!("Chat completion failed with HTTP {}", status);
            return Err(classify_http_failure(status, &text));
        }

        let data: ApiResponse = response
            .json()
            .await
            .map_err(|e| PersonaError::ResponseParse(e.to_string()))?;

        extract_text(data)
    }

    fn provider_name(&self) -> &str {
        self.config.provider.label()
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
