//! CSRF Guard
//!
//! Anti-replay token lifecycle management for request handlers.
//!
//! # Features
//!
//! - 256-bit random tokens from the operating system's CSPRNG
//! - Digest-keyed storage on the issuing side; plaintext never used as a key
//! - Single-use validation, linearizable per token under concurrent access
//! - Short post-consumption grace window that reports replays as "already used"
//! - Background sweeper with explicit shutdown
//! - Issuing and receiving sides sharing one lifecycle policy
//!
//! # Example
//!
//! ```rust,ignore
//! use csrf_guard::{csrf_config, CsrfIssuer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), csrf_guard::CsrfError> {
//!     let config = csrf_config().default_ttl_minutes(30).build()?;
//!     let issuer = CsrfIssuer::new(config);
//!     issuer.start_sweeper()?;
//!
//!     // Embed in the rendered form.
//!     let token = issuer.issue()?;
//!
//!     // On the next mutating request.
//!     let outcome = issuer.validate(Some(token.expose()), true);
//!     if !outcome.valid {
//!         // Respond with outcome.public_message(), never the reason.
//!     }
//!
//!     issuer.stop();
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: Tokens, records, validation outcomes, configuration
//! - `error`: Error hierarchy and user-facing messages
//! - `core`: Token codec and time source
//! - `token`: Storage, key derivation, lifecycle policy, sweeper
//! - `flows`: Issuing and receiving sides
//! - `builders`: Fluent configuration builder
//! - `telemetry`: Logging and metrics

pub mod builders;
pub mod core;
pub mod error;
pub mod flows;
pub mod telemetry;
pub mod token;
pub mod types;

// Re-export flows
pub use flows::{create_issuer, create_receiver, CsrfIssuer, CsrfReceiver};

// Re-export builders
pub use builders::{csrf_config, CsrfConfigBuilder};

// Re-export errors
pub use error::{
    get_user_message, ConfigurationError, CsrfError, CsrfResult, EntropyError, SweeperError,
    TokenError, GENERIC_REJECTION_MESSAGE,
};

// Re-export types
pub use types::{
    duration_ms, CsrfConfig, RejectReason, Side, Token, TokenDigest, TokenRecord,
    ValidationOutcome, DEFAULT_GRACE_PERIOD, DEFAULT_MAX_TOKEN_LENGTH, DEFAULT_SWEEP_INTERVAL,
    DEFAULT_TOKEN_TTL,
};

// Re-export core components
pub use crate::core::{
    digest_token, is_well_formed, Clock, DefaultTokenCodec, MockClock, MockTokenCodec,
    SystemClock, TokenCodec, TOKEN_BYTES,
};

// Re-export token management
pub use token::{
    DigestKeys, InMemoryTokenStore, IssuingStore, KeyDerivation, PlainKeys, ReceivingStore,
    Redemption, SweepReport, Sweeper, SweeperHandle, TokenLifecycle, TokenStore,
};

// Re-export telemetry
pub use telemetry::{
    no_op_metrics, CsrfLogContext, CsrfMetrics, InMemoryLogger, InMemoryMetrics, LogEntry,
    LogLevel, Logger, MetricEntry, MetricLabels, NoOpMetrics, TracingLogger,
};
