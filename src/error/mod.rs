//! CSRF Error Types
//!
//! Error hierarchy for token issuance, configuration, and opt-in rejection.

use thiserror::Error;

use crate::types::RejectReason;

/// Generic message shown to untrusted callers for any rejected token.
pub const GENERIC_REJECTION_MESSAGE: &str = "Invalid or expired security token";

/// Root error type for CSRF operations.
#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Entropy error: {0}")]
    Entropy(#[from] EntropyError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Sweeper error: {0}")]
    Sweeper(#[from] SweeperError),

    /// A failed validation converted into an error.
    ///
    /// The display text is deliberately generic; `reason` is for internal
    /// logging only.
    #[error("{}", GENERIC_REJECTION_MESSAGE)]
    Rejected { reason: RejectReason },
}

impl CsrfError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CSRF_CONFIG",
            Self::Entropy(_) => "CSRF_ENTROPY",
            Self::Token(_) => "CSRF_TOKEN",
            Self::Sweeper(_) => "CSRF_SWEEPER",
            Self::Rejected { .. } => "CSRF_REJECTED",
        }
    }

    /// Check if this error is an ordinary validation rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Internal rejection reason, if this is a rejection.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Rejected { reason } => Some(*reason),
            _ => None,
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid duration for {field}: must be greater than zero")]
    InvalidDuration { field: String },

    #[error("Invalid length for {field}: {value}")]
    InvalidLength { field: String, value: usize },
}

/// Random source error.
#[derive(Error, Debug)]
pub enum EntropyError {
    #[error("Entropy source unavailable: {message}")]
    SourceUnavailable { message: String },
}

/// Token-related error.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
}

/// Background sweeper error.
#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("No async runtime available to host the sweeper")]
    NoRuntime,
}

/// Result type for CSRF operations.
pub type CsrfResult<T> = Result<T, CsrfError>;

/// Get a user-facing error message.
///
/// Never distinguishes between rejection reasons.
pub fn get_user_message(error: &CsrfError) -> String {
    match error {
        CsrfError::Rejected { .. } | CsrfError::Token(_) => GENERIC_REJECTION_MESSAGE.to_string(),
        CsrfError::Entropy(_) => {
            "A security token could not be generated. Please try again later.".to_string()
        }
        CsrfError::Configuration(_) | CsrfError::Sweeper(_) => {
            "An internal error occurred.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = CsrfError::Entropy(EntropyError::SourceUnavailable {
            message: "boom".to_string(),
        });
        assert_eq!(error.error_code(), "CSRF_ENTROPY");

        let error = CsrfError::Rejected {
            reason: RejectReason::Expired,
        };
        assert_eq!(error.error_code(), "CSRF_REJECTED");
        assert!(error.is_rejection());
    }

    #[test]
    fn test_rejection_display_is_generic() {
        for reason in [
            RejectReason::Missing,
            RejectReason::Invalid,
            RejectReason::Expired,
            RejectReason::AlreadyUsed,
        ] {
            let error = CsrfError::Rejected { reason };
            assert_eq!(error.to_string(), GENERIC_REJECTION_MESSAGE);
            assert_eq!(get_user_message(&error), GENERIC_REJECTION_MESSAGE);
            assert_eq!(error.reject_reason(), Some(reason));
        }
    }

    #[test]
    fn test_from_conversions() {
        let error: CsrfError = ConfigurationError::InvalidDuration {
            field: "default_ttl".to_string(),
        }
        .into();
        assert!(matches!(error, CsrfError::Configuration(_)));
        assert!(!error.is_rejection());
        assert_eq!(error.reject_reason(), None);
    }
}
