//! Token Types
//!
//! Opaque token values, storage digests, and stored token records.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Which side of the protocol a store serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Mints tokens; stores them under their digest.
    Issuer,
    /// Holds tokens handed over by a remote issuer.
    Receiver,
}

impl Side {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issuer => "issuer",
            Self::Receiver => "receiver",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque CSRF token handed to callers.
///
/// The value is held as a secret so it never shows up in `Debug` output.
pub struct Token(SecretString);

impl Token {
    /// Wrap a plaintext token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::new(value.into()))
    }

    /// Expose the plaintext value for embedding in a response.
    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }

    /// Consume the token and return the plaintext value.
    pub fn into_string(self) -> String {
        self.expose().to_string()
    }
}

impl Clone for Token {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Token {}

/// One-way digest of a token, used as the issuing side's storage key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Wrap an already encoded digest.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix, safe to put in log lines.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(8);
        &self.0[..end]
    }

    /// Consume and return the encoded digest.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored token metadata.
#[derive(Clone, Debug)]
pub struct TokenRecord {
    /// Plaintext token (issuing side only).
    pub token: Option<Token>,
    /// Creation timestamp (Unix milliseconds).
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds).
    pub expires_at: u64,
    /// Whether the token has been consumed.
    pub used: bool,
}

impl TokenRecord {
    /// Create a fresh, unused record.
    ///
    /// `expires_at` is clamped so it never precedes `created_at`.
    pub fn new(token: Option<Token>, created_at: u64, expires_at: u64) -> Self {
        Self {
            token,
            created_at,
            expires_at: expires_at.max(created_at),
            used: false,
        }
    }

    /// Check if the record is past its expiry.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    /// Check if the sweeper should evict the record.
    pub fn is_sweepable(&self, now_ms: u64) -> bool {
        self.expires_at <= now_ms
    }

    /// Check for a record whose timestamps are inconsistent.
    pub fn is_anomalous(&self) -> bool {
        self.expires_at < self.created_at
    }

    /// Mark consumed, shortening the lifetime to the grace window.
    pub fn consume(&mut self, now_ms: u64, grace_ms: u64) {
        self.used = true;
        self.expires_at = now_ms.saturating_add(grace_ms).max(self.created_at);
    }

    /// Remaining lifetime in milliseconds.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("super-secret");
        assert_eq!(format!("{:?}", token), "Token([REDACTED])");
        assert_eq!(token.expose(), "super-secret");
    }

    #[test]
    fn test_record_clamps_expiry() {
        let record = TokenRecord::new(None, 1_000, 500);
        assert_eq!(record.expires_at, 1_000);
        assert!(!record.is_anomalous());
    }

    #[test]
    fn test_record_expiry_boundaries() {
        let record = TokenRecord::new(None, 1_000, 2_000);
        assert!(!record.is_expired(2_000));
        assert!(record.is_expired(2_001));
        assert!(record.is_sweepable(2_000));
        assert!(!record.is_sweepable(1_999));
        assert_eq!(record.remaining_ms(1_500), 500);
    }

    #[test]
    fn test_consume_sets_grace() {
        let mut record = TokenRecord::new(None, 1_000, 3_600_000);
        record.consume(10_000, 5_000);
        assert!(record.used);
        assert_eq!(record.expires_at, 15_000);
    }

    #[test]
    fn test_digest_short() {
        let digest = TokenDigest::new("abcdefghijkl");
        assert_eq!(digest.short(), "abcdefgh");
        assert_eq!(TokenDigest::new("abc").short(), "abc");
    }
}
