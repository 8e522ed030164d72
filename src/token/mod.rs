//! Token Management
//!
//! Token lifecycle management: storage, key derivation, validation policy,
//! and background sweeping.
//!
//! This module provides:
//!
//! - **Token Storage**: Concurrent in-memory store with atomic redemption
//! - **Key Derivation**: Digest keys (issuer) and plain keys (receiver)
//! - **Token Lifecycle**: Issuance defaults and single-use validation
//! - **Sweeper**: Periodic eviction of expired tokens

pub mod keys;
pub mod manager;
pub mod storage;
pub mod sweeper;

// Key Derivation
pub use keys::{DigestKeys, KeyDerivation, PlainKeys};

// Token Storage
pub use storage::{
    create_issuing_store, create_receiving_store, InMemoryTokenStore, IssuingStore,
    ReceivingStore, Redemption, SweepReport, TokenStore,
};

// Token Lifecycle
pub use manager::TokenLifecycle;

// Sweeper
pub use sweeper::{Sweeper, SweeperHandle};
