//! Key Derivation
//!
//! How each side turns a presented token into a storage key.

use std::sync::Arc;

use crate::core::TokenCodec;
use crate::types::Side;

/// Storage key derivation interface.
pub trait KeyDerivation: Send + Sync {
    /// Derive the storage key for a token value.
    fn derive_key(&self, token: &str) -> String;

    /// Whether records keep the plaintext token alongside the key.
    fn retains_plaintext(&self) -> bool;

    /// Side this derivation belongs to.
    fn side(&self) -> Side;
}

/// Issuing side: tokens are stored under their digest.
#[derive(Clone)]
pub struct DigestKeys {
    codec: Arc<dyn TokenCodec>,
}

impl DigestKeys {
    /// Create digest key derivation using the codec's digest.
    pub fn new(codec: Arc<dyn TokenCodec>) -> Self {
        Self { codec }
    }
}

impl KeyDerivation for DigestKeys {
    fn derive_key(&self, token: &str) -> String {
        self.codec.digest(token).into_string()
    }

    fn retains_plaintext(&self) -> bool {
        true
    }

    fn side(&self) -> Side {
        Side::Issuer
    }
}

/// Receiving side: the handed-over token is the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainKeys;

impl KeyDerivation for PlainKeys {
    fn derive_key(&self, token: &str) -> String {
        token.to_string()
    }

    fn retains_plaintext(&self) -> bool {
        false
    }

    fn side(&self) -> Side {
        Side::Receiver
    }
}
