//! Mapping of HTTP failures onto the persona error taxonomy.

use persona_types::PersonaError;
use serde::Deserialize;

/// Error envelope shared by Gemini and OpenAI-style APIs
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    /// Gemini: "PERMISSION_DENIED", "INVALID_ARGUMENT", ...
    #[serde(default)]
    status: Option<String>,
    /// OpenAI: "invalid_api_key", ...
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Markers that identify a rejected credential inside an error body.
const CREDENTIAL_MARKERS: &[&str] = &[
    "API_KEY_INVALID",
    "API key not valid",
    "PERMISSION_DENIED",
    "invalid_api_key",
    "Incorrect API key",
];

/// Classify a non-2xx response.
pub fn classify_http_failure(status: u16, body: &str) -> PersonaError {
    let detail = error_message(body).unwrap_or_else(|| truncate(body, 200));

    let credential_rejected = matches!(status, 401 | 403)
        || CREDENTIAL_MARKERS.iter().any(|m| body.contains(m));

    if credential_rejected {
        PersonaError::Authorization(format!("HTTP {}: {}", status, detail))
    } else {
        PersonaError::Transport(format!("HTTP {}: {}", status, detail))
    }
}

/// Classify a failure to reach the service at all.
pub fn network_failure(e: impl std::fmt::Display) -> PersonaError {
    PersonaError::Transport(e.to_string())
}

fn error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let err = envelope.error;
    let tag = err
        .status
        .or_else(|| err.code.map(|c| c.as_str().map(str::to_string).unwrap_or_else(|| c.to_string())));
    Some(match tag {
        Some(tag) => format!("{} ({})", err.message, tag),
        None => err.message,
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}
