//! CSRF Core Components
//!
//! Token codec and time source.

pub mod clock;
pub mod codec;

pub use clock::*;
pub use codec::*;
