//! Persona generator — prompt, output schema and response validation.
//!
//! The schema follows JSON Schema with `additionalProperties: false` so it can
//! be handed to strict structured-output providers unchanged; adapters
//! translate it into their own dialect where needed.

use std::rc::Rc;

use persona_types::{
    PersonaError, Result,
    config::LlmConfig,
    persona::{PersonaFields, MAX_COLORS, MIN_COLORS},
};
use serde_json::{json, Value};

use crate::ports::{GenerationPort, GenerationRequest};

pub const SCHEMA_NAME: &str = "name_persona";

/// Turns a name into validated persona fields through a [`GenerationPort`].
pub struct PersonaGenerator {
    port: Rc<dyn GenerationPort>,
    model: String,
    temperature: f32,
}

impl PersonaGenerator {
    pub fn new(port: Rc<dyn GenerationPort>, config: &LlmConfig) -> Self {
        Self {
            port,
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.port.provider_name()
    }

    /// Generate persona fields for an already-trimmed name.
    ///
    /// Makes exactly one call to the port; failures are returned as-is and
    /// never retried here.
    pub async fn generate(&self, name: &str) -> Result<PersonaFields> {
        if name.trim().is_empty() {
            return Err(PersonaError::InvalidName);
        }

        let req = GenerationRequest {
            prompt: build_prompt(name),
            schema: persona_schema(),
            schema_name: SCHEMA_NAME.to_string(),
            model: self.model.clone(),
            temperature: self.temperature,
        };

        log::debug!("Generating persona for {:?} via {}", name, self.provider_name());
        let response = self.port.generate_content(req).await?;
        if let Some(usage) = &response.usage {
            log::debug!(
                "Token usage: {} prompt / {} completion",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        parse_persona_response(&response.text)
    }
}

/// The instruction sent for `name`. Output language is Simplified Chinese.
pub fn build_prompt(name: &str) -> String {
    format!(
        "分析名字 \"{name}\" 的性格与气质，为它挑选 {MIN_COLORS} 到 {MAX_COLORS} 种适合做渐变的颜色\
         （以 #RRGGBB 十六进制代码形式），并生成一句能够触动人心、契合这个名字独特韵味的座右铭或优美语句，\
         再用一到两个词概括它的情绪或性格特质。请使用中文。"
    )
}

/// Output schema: `{colors: string[], quote: string, mood: string}`, all required.
pub fn persona_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "colors": {
                "type": "array",
                "items": { "type": "string" },
                "description": "2-3 hex color codes for a gradient"
            },
            "quote": {
                "type": "string",
                "description": "A poetic sentence fitting the name"
            },
            "mood": {
                "type": "string",
                "description": "A one or two word mood or personality trait (e.g. 灵动, 深邃)"
            }
        },
        "required": ["colors", "quote", "mood"],
        "additionalProperties": false
    })
}

/// Strictly deserialize and validate a raw response.
pub fn parse_persona_response(text: &str) -> Result<PersonaFields> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(PersonaError::ResponseParse("empty response".to_string()));
    }

    let fields: PersonaFields = serde_json::from_str(body).map_err(|e| {
        log::warn!("Failed to parse persona response: {}", e);
        PersonaError::from(e)
    })?;
    fields.validate()?;
    Ok(fields)
}

/// Models occasionally wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) that may follow the fence.
    let body = match rest.split_once('\n') {
        Some((tag, body)) if !tag.contains('{') => body,
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
