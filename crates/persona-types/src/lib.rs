pub mod persona;
pub mod event;
pub mod config;
pub mod error;


pub use error::{ErrorKind, PersonaError};
pub type Result<T> = std::result::Result<T, PersonaError>;
