//! egui presentation layer. Panels read [`persona_core::session::SessionState`]
//! and report what the user did as [`state::SessionAction`]s; they never
//! mutate the session directly.

pub mod panels;
pub mod state;
pub mod theme;
