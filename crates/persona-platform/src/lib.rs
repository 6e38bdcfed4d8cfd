//! Browser adapters for the persona-core ports.

pub mod llm;
pub mod timeout;
