//! # Opswatch Config
//!
//! Configuration management for the opswatch monitoring service.
//!
//! Configuration is primarily environment-driven (the service is meant to run
//! on hosted platforms that inject env vars), with an optional TOML file for
//! local development.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
