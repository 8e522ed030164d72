//! Token Storage
//!
//! Concurrent in-memory token store with expiry tracking.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::core::Clock;
use crate::token::keys::{DigestKeys, KeyDerivation, PlainKeys};
use crate::types::{Side, Token, TokenRecord};

/// Outcome of an atomic lookup-and-consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// No record for the token.
    NotFound,
    /// Record was past expiry and has been deleted.
    Expired,
    /// Record was already consumed; it stays until its grace window ends.
    AlreadyUsed,
    /// Record was live and unused (and is now consumed, if requested).
    Accepted,
}

/// Result of a sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records removed, anomalies included.
    pub removed: usize,
    /// Records evicted because their timestamps were inconsistent.
    pub anomalies: usize,
}

/// Token store interface.
///
/// Every operation takes the plaintext token; the store derives its own key.
pub trait TokenStore: Send + Sync {
    /// Insert or replace a fresh record expiring at `expires_at` (Unix ms).
    fn put(&self, token: &str, expires_at: u64);

    /// Look up a record.
    fn get(&self, token: &str) -> Option<TokenRecord>;

    /// Mark a record used and shorten its expiry to `now + grace_ms`.
    ///
    /// No-op if the record is absent.
    fn mark_used(&self, token: &str, grace_ms: u64);

    /// Remove a record. Returns whether one was present.
    fn delete(&self, token: &str) -> bool;

    /// Remove every record with `expires_at <= now_ms`.
    fn sweep(&self, now_ms: u64) -> SweepReport;

    /// Atomically check expiry and use status, consuming on success.
    fn redeem(&self, token: &str, now_ms: u64, consume: bool, grace_ms: u64) -> Redemption;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Check if the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Side this store serves.
    fn side(&self) -> Side;
}

/// In-memory token store, sharded for concurrent access.
pub struct InMemoryTokenStore<K: KeyDerivation> {
    records: DashMap<String, TokenRecord>,
    keys: K,
    clock: Arc<dyn Clock>,
}

/// Issuing-side store, keyed by token digest.
pub type IssuingStore = InMemoryTokenStore<DigestKeys>;

/// Receiving-side store, keyed by the token itself.
pub type ReceivingStore = InMemoryTokenStore<PlainKeys>;

impl<K: KeyDerivation> InMemoryTokenStore<K> {
    /// Create new store.
    pub fn new(keys: K, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            keys,
            clock,
        }
    }

    /// Key derivation in use.
    pub fn keys(&self) -> &K {
        &self.keys
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, token: &str, record: TokenRecord) {
        self.records.insert(self.keys.derive_key(token), record);
    }
}

impl<K: KeyDerivation> TokenStore for InMemoryTokenStore<K> {
    fn put(&self, token: &str, expires_at: u64) {
        let now = self.clock.now_ms();
        let plaintext = self.keys.retains_plaintext().then(|| Token::new(token));
        self.records.insert(
            self.keys.derive_key(token),
            TokenRecord::new(plaintext, now, expires_at),
        );
    }

    fn get(&self, token: &str) -> Option<TokenRecord> {
        self.records
            .get(&self.keys.derive_key(token))
            .map(|record| record.value().clone())
    }

    fn mark_used(&self, token: &str, grace_ms: u64) {
        let now = self.clock.now_ms();
        if let Some(mut record) = self.records.get_mut(&self.keys.derive_key(token)) {
            record.consume(now, grace_ms);
        }
    }

    fn delete(&self, token: &str) -> bool {
        self.records.remove(&self.keys.derive_key(token)).is_some()
    }

    fn sweep(&self, now_ms: u64) -> SweepReport {
        let mut report = SweepReport::default();

        // retain locks one shard at a time
        self.records.retain(|_, record| {
            if record.is_anomalous() {
                report.anomalies += 1;
                report.removed += 1;
                false
            } else if record.is_sweepable(now_ms) {
                report.removed += 1;
                false
            } else {
                true
            }
        });

        report
    }

    fn redeem(&self, token: &str, now_ms: u64, consume: bool, grace_ms: u64) -> Redemption {
        // The entry holds the shard write lock until it is dropped, so the
        // check and the transition to used cannot interleave with another
        // redemption of the same key.
        match self.records.entry(self.keys.derive_key(token)) {
            Entry::Vacant(_) => Redemption::NotFound,
            Entry::Occupied(mut entry) => {
                let (expired, used) = {
                    let record = entry.get();
                    (record.is_expired(now_ms), record.used)
                };

                if expired {
                    entry.remove();
                    Redemption::Expired
                } else if used {
                    // held until expiry so every replay reports already used
                    Redemption::AlreadyUsed
                } else {
                    if consume {
                        entry.get_mut().consume(now_ms, grace_ms);
                    }
                    Redemption::Accepted
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn side(&self) -> Side {
        self.keys.side()
    }
}

/// Create issuing-side store.
pub fn create_issuing_store(keys: DigestKeys, clock: Arc<dyn Clock>) -> IssuingStore {
    InMemoryTokenStore::new(keys, clock)
}

/// Create receiving-side store.
pub fn create_receiving_store(clock: Arc<dyn Clock>) -> ReceivingStore {
    InMemoryTokenStore::new(PlainKeys, clock)
}
