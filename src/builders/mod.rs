//! Builders
//!
//! Fluent builders for configuration.

pub mod config;

pub use config::{csrf_config, CsrfConfigBuilder};
