pub mod errors;
pub mod gemini;
pub mod openai_compat;

use std::rc::Rc;

use persona_core::ports::GenerationPort;
use persona_types::config::{LlmConfig, LlmProvider};

use crate::timeout::WithTimeout;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;

/// Pick the adapter for the configured provider and put the watchdog in
/// front of it when a timeout is configured.
pub fn build_generation_port(config: &LlmConfig) -> Rc<dyn GenerationPort> {
    let port: Rc<dyn GenerationPort> = match config.provider {
        LlmProvider::Gemini => Rc::new(GeminiProvider::new(config.clone())),
        LlmProvider::OpenAI | LlmProvider::Custom => {
            Rc::new(OpenAiCompatProvider::new(config.clone()))
        }
    };

    match config.timeout_ms {
        Some(ms) if ms > 0 => Rc::new(WithTimeout::new(port, ms)),
        _ => port,
    }
}
