use serde::{Deserialize, Serialize};

use crate::{PersonaError, Result};

/// Number of personas kept in history, the displayed one included.
pub const DEFAULT_HISTORY_CAPACITY: usize = 9;

/// Default watchdog for a single generation call.
pub const DEFAULT_TIMEOUT_MS: u32 = 60_000;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Defaults, with the credential resolved from the build environment.
    pub fn from_env() -> Self {
        Self {
            llm: LlmConfig::from_env(),
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub temperature: f32,
    /// Watchdog for one call; `None` waits as long as the transport does.
    pub timeout_ms: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: LlmProvider::Gemini.default_model().to_string(),
            api_key: None,
            api_base: None,
            temperature: 1.0,
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl LlmConfig {
    /// Resolve the credential once, from the `API_KEY` variable present when
    /// the WASM bundle was built. There is no runtime environment in the
    /// browser, so this is the startup read.
    pub fn from_env() -> Self {
        Self {
            api_key: option_env!("API_KEY").map(str::to_string),
            ..Self::default()
        }
    }

    /// The configured credential, or `MissingCredential` when absent or blank.
    pub fn credential(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PersonaError::MissingCredential),
        }
    }

    pub fn base_url(&self) -> String {
        self.api_base
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmProvider {
    Gemini,
    OpenAI,
    /// Any endpoint speaking the OpenAI chat completions protocol
    Custom,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Custom => "",
        }
    }

    pub fn default_model(&self) -> &str {
        match self {
            LlmProvider::Gemini => "gemini-3-flash-preview",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::Custom => "",
        }
    }

    pub fn all() -> &'static [LlmProvider] {
        &[LlmProvider::Gemini, LlmProvider::OpenAI, LlmProvider::Custom]
    }

    pub fn label(&self) -> &str {
        match self {
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Capacity actually enforced; a window of zero would drop the record
    /// that was just displayed.
    pub fn effective_capacity(&self) -> usize {
        self.history_capacity.max(1)
    }
}
