//! Validation Types
//!
//! Structured outcomes of token validation.

use serde::Serialize;
use std::fmt;

use crate::error::{CsrfError, CsrfResult, GENERIC_REJECTION_MESSAGE};

/// Why a presented token was rejected.
///
/// Internal only. Responses to untrusted callers should use
/// [`ValidationOutcome::public_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectReason {
    /// No token, or input that cannot be a token.
    #[serde(rename = "missing")]
    Missing,
    /// Unknown token.
    #[serde(rename = "invalid")]
    Invalid,
    /// Token past its expiry.
    #[serde(rename = "expired")]
    Expired,
    /// Token already consumed (replay).
    #[serde(rename = "already used")]
    AlreadyUsed,
}

impl RejectReason {
    /// Reason string used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Invalid => "invalid",
            Self::Expired => "expired",
            Self::AlreadyUsed => "already used",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// Whether the token was accepted.
    pub valid: bool,
    /// Rejection reason, when not valid.
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl ValidationOutcome {
    /// Accepted outcome.
    pub fn accepted() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// Rejected outcome.
    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Check if the token was accepted.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Message safe to return to an unauthenticated caller.
    pub fn public_message(&self) -> Option<&'static str> {
        if self.valid {
            None
        } else {
            Some(GENERIC_REJECTION_MESSAGE)
        }
    }

    /// Convert a rejection into [`CsrfError::Rejected`].
    pub fn into_result(self) -> CsrfResult<()> {
        match (self.valid, self.reason) {
            (true, _) => Ok(()),
            (false, reason) => Err(CsrfError::Rejected {
                reason: reason.unwrap_or(RejectReason::Invalid),
            }),
        }
    }
}
