pub mod card;
pub mod history;
pub mod input;
pub mod settings;
