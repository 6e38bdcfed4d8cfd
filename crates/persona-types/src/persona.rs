use serde::{Deserialize, Serialize};

use crate::{PersonaError, Result};

/// Smallest and largest palette the generator accepts.
pub const MIN_COLORS: usize = 2;
pub const MAX_COLORS: usize = 3;

/// Validated output of one generation call.
///
/// Every field is required on the wire; serde rejects a payload that omits
/// any of them instead of filling in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaFields {
    pub colors: Vec<String>,
    pub quote: String,
    pub mood: String,
}

impl PersonaFields {
    /// Check the post-conditions of a generation call.
    pub fn validate(&self) -> Result<()> {
        if self.colors.is_empty() {
            return Err(PersonaError::ResponseParse("colors is empty".to_string()));
        }
        if !(MIN_COLORS..=MAX_COLORS).contains(&self.colors.len()) {
            return Err(PersonaError::ResponseParse(format!(
                "expected {}-{} colors, got {}",
                MIN_COLORS,
                MAX_COLORS,
                self.colors.len()
            )));
        }
        if let Some(bad) = self.colors.iter().find(|c| !is_hex_color(c)) {
            return Err(PersonaError::ResponseParse(format!(
                "not a #RRGGBB color: {:?}",
                bad
            )));
        }
        if self.quote.trim().is_empty() {
            return Err(PersonaError::ResponseParse("quote is empty".to_string()));
        }
        if self.mood.trim().is_empty() {
            return Err(PersonaError::ResponseParse("mood is empty".to_string()));
        }
        Ok(())
    }
}

/// One successful generation, as shown on the card and kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaRecord {
    pub name: String,
    pub colors: Vec<String>,
    pub quote: String,
    pub mood: String,
    /// Creation time in unix milliseconds; doubles as the history id.
    pub timestamp: u64,
}

impl PersonaRecord {
    pub fn new(name: impl Into<String>, fields: PersonaFields, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            colors: fields.colors,
            quote: fields.quote,
            mood: fields.mood,
            timestamp,
        }
    }

    /// First character of the name, used as the avatar glyph.
    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }
}

/// `#` followed by exactly six hex digits, either case.
pub fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
