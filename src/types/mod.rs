//! CSRF Types
//!
//! Core type definitions for token lifecycle operations.

pub mod config;
pub mod token;
pub mod validation;

pub use config::*;
pub use token::*;
pub use validation::*;
