//! Gemini adapter.
//!
//! Calls `generateContent` with JSON mode and a response schema, so the
//! model's answer is the serialized persona object.
//! Uses browser `fetch()` via gloo-net for WASM compatibility.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use persona_core::ports::*;
use persona_types::{config::LlmConfig, PersonaError, Result};

use super::errors::{classify_http_failure, network_failure};

pub struct GeminiProvider {
    config: LlmConfig,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config.base_url();
        Self { config, base_url }
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

pub fn build_request_body(req: &GenerationRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": req.prompt }],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": to_gemini_schema(&req.schema),
            "temperature": req.temperature,
        },
    })
}

/// Gemini's schema dialect: upper-case type names and no
/// `additionalProperties`.
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                match key.as_str() {
                    "additionalProperties" => {}
                    "type" => {
                        let upper = value
                            .as_str()
                            .map(|t| Value::String(t.to_ascii_uppercase()))
                            .unwrap_or_else(|| value.clone());
                        out.insert(key.clone(), upper);
                    }
                    // property names are user data, not schema keywords
                    "properties" => {
                        let props = value
                            .as_object()
                            .map(|p| {
                                p.iter()
                                    .map(|(name, s)| (name.clone(), to_gemini_schema(s)))
                                    .collect::<Map<_, _>>()
                            })
                            .unwrap_or_default();
                        out.insert(key.clone(), Value::Object(props));
                    }
                    _ => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Concatenated text of the first candidate.
pub fn extract_text(data: ApiResponse) -> Result<GenerationResponse> {
    if let Some(feedback) = data.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(PersonaError::ResponseParse(format!("prompt blocked: {}", feedback)));
    }

    let candidate = data
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| PersonaError::ResponseParse("No candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PersonaError::ResponseParse(format!(
            "Empty candidate (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let usage = data.usage_metadata.map(|u| TokenUsage {
        prompt_tokens: u.prompt_token_count.unwrap_or(0),
        completion_tokens: u.candidates_token_count.unwrap_or(0),
    });

    Ok(GenerationResponse { text, usage })
}

#[async_trait(?Send)]
impl GenerationPort for GeminiProvider {
    async fn generate_content(&self, req: GenerationRequest) -> Result<GenerationResponse> {
        let api_key = self.config.credential()?;
        let url = self.endpoint(&req.model);
        let body = build_request_body(&req);

        let response = Request::post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
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
            log::warn!("Gemini request failed with HTTP {}", status);
            return Err(classify_http_failure(status, &text));
        }

        let data: ApiResponse = response
            .json()
            .await
            .map_err(|e| PersonaError::ResponseParse(e.to_string()))?;

        extract_text(data)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<ApiUsage>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<ApiPromptFeedback>,
}

#[derive(Deserialize)]
struct ApiCandidate {
    content: Option<ApiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Deserialize)]
struct ApiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct ApiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}
