//! Persona core — generation and session state, independent of the browser.
//!
//! Everything that talks to the outside world goes through the traits in
//! [`ports`]; `persona-platform` supplies the implementations.

pub mod ports;
pub mod generator;
pub mod session;
pub mod event_bus;

#[cfg(test)]
mod tests;
