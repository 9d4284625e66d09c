//! Configuration validation
//!
//! Rejects configurations that would fail late or silently never act.

mod error;
mod validator;

#[cfg(test)]
mod tests;

pub use error::ValidationError;
pub use validator::validate_config;
