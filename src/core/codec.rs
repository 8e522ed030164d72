//! Token Codec
//!
//! Random token generation and one-way digests.

use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CsrfError, EntropyError};
use crate::types::{Token, TokenDigest};

/// Random bytes per token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Token codec interface (for dependency injection).
pub trait TokenCodec: Send + Sync {
    /// Mint a new random token.
    fn mint(&self) -> Result<Token, CsrfError>;

    /// Compute the storage digest of a token value.
    fn digest(&self, token: &str) -> TokenDigest {
        digest_token(token)
    }
}

/// SHA-256 digest of the token's bytes, base64url encoded.
pub fn digest_token(token: &str) -> TokenDigest {
    let hash = Sha256::digest(token.as_bytes());
    TokenDigest::new(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash))
}

/// Check whether input could be a token at all.
///
/// Rejects empty input, input longer than `max_len`, and anything with
/// whitespace or control characters.
pub fn is_well_formed(candidate: &str, max_len: usize) -> bool {
    !candidate.is_empty()
        && candidate.len() <= max_len
        && candidate.bytes().all(|b| b.is_ascii_graphic())
}

/// Default codec backed by the operating system's random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTokenCodec;

impl DefaultTokenCodec {
    /// Create new codec.
    pub fn new() -> Self {
        Self
    }
}

impl TokenCodec for DefaultTokenCodec {
    fn mint(&self) -> Result<Token, CsrfError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            CsrfError::Entropy(EntropyError::SourceUnavailable {
                message: e.to_string(),
            })
        })?;

        Ok(Token::new(
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        ))
    }
}

/// Mock codec for testing.
#[derive(Default)]
pub struct MockTokenCodec {
    next_tokens: parking_lot::Mutex<VecDeque<String>>,
    mint_history: parking_lot::Mutex<Vec<String>>,
    fail_entropy: AtomicBool,
}

impl MockTokenCodec {
    /// Create new mock codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next token to mint.
    pub fn set_next_token(&self, token: impl Into<String>) -> &Self {
        self.next_tokens.lock().push_back(token.into());
        self
    }

    /// Make `mint` fail as if the random source were unreadable.
    pub fn set_entropy_failure(&self, fail: bool) -> &Self {
        self.fail_entropy.store(fail, Ordering::SeqCst);
        self
    }

    /// Get mint history.
    pub fn get_mint_history(&self) -> Vec<String> {
        self.mint_history.lock().clone()
    }
}

impl TokenCodec for MockTokenCodec {
    fn mint(&self) -> Result<Token, CsrfError> {
        if self.fail_entropy.load(Ordering::SeqCst) {
            return Err(CsrfError::Entropy(EntropyError::SourceUnavailable {
                message: "mock entropy failure".to_string(),
            }));
        }

        let value = self
            .next_tokens
            .lock()
            .pop_front()
            .unwrap_or_else(|| format!("mock-token-{}", rand::random::<u64>()));

        self.mint_history.lock().push(value.clone());
        Ok(Token::new(value))
    }
}
