//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `persona-core` (pure Rust).
//! Implementations live in `persona-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use serde_json::Value;
use persona_types::Result;

// ─── Generation Port ─────────────────────────────────────────

/// One structured-output request to the generation service
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Natural-language instruction, subject name already embedded
    pub prompt: String,
    /// JSON Schema the answer must conform to
    pub schema: Value,
    /// Name the schema is registered under, for providers that want one
    pub schema_name: String,
    pub model: String,
    pub temperature: f32,
}

/// Raw answer of the generation service
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// The structured answer, still serialized as text
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[async_trait(?Send)]
pub trait GenerationPort {
    /// Perform exactly one call. Adapters classify failures into
    /// `MissingCredential`, `Authorization`, `Transport` or `ResponseParse`.
    async fn generate_content(&self, req: GenerationRequest) -> Result<GenerationResponse>;

    /// Name of this backend (for logging/debug)
    fn provider_name(&self) -> &str;
}

// ─── Clock Port ──────────────────────────────────────────────

pub trait Clock {
    /// Current time in unix milliseconds
    fn now_millis(&self) -> u64;
}

/// Wall clock; chrono's `wasmbind` feature routes this through `Date.now()`
/// in the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}
