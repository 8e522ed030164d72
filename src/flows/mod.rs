//! CSRF Flows
//!
//! The two sides of the token protocol.
//!
//! - **Issuer**: mints tokens and stores them under their digest
//! - **Receiver**: stores tokens handed over by a remote issuer
//!
//! Both share one [`TokenLifecycle`](crate::token::TokenLifecycle) policy and
//! differ only in how a token becomes a storage key.

pub mod issuer;
pub mod receiver;

pub use issuer::CsrfIssuer;
pub use receiver::CsrfReceiver;

use crate::types::CsrfConfig;

/// Create issuer with production codec and clock.
pub fn create_issuer(config: CsrfConfig) -> CsrfIssuer {
    CsrfIssuer::new(config)
}

/// Create receiver with the system clock.
pub fn create_receiver(config: CsrfConfig) -> CsrfReceiver {
    CsrfReceiver::new(config)
}
