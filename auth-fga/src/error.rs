use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FgaError {
    #[error("Invalid identifier: {0} must not be blank")]
    InvalidIdentifier(&'static str),

    /// No client could be configured for this process.
    #[error("Authorization service unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication with the authorization service failed: {0}")]
    Authentication(String),

    #[error("Authorization service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Authorization service returned {status} ({code}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Tuple already exists: {0}")]
    TupleAlreadyExists(String),

    #[error("Tuple does not exist: {0}")]
    TupleNotFound(String),

    #[error("Tuple write failed: {0}")]
    TupleWriteFailed(String),

    #[error("Tuple delete failed: {0}")]
    TupleDeleteFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl FgaError {
    /// Whether a decision that hit this error should be answered by the
    /// fallback policy. Everything the remote service or the network can do to
    /// us is recoverable; configuration and internal faults are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FgaError::Configuration(_) | FgaError::Internal(_))
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FgaError::InvalidIdentifier(_) => "invalid_identifier",
            FgaError::Unavailable(_) => "unavailable",
            FgaError::Network(_) => "network",
            FgaError::Authentication(_) => "authentication",
            FgaError::Timeout(_) => "timeout",
            FgaError::Remote { .. } => "remote",
            FgaError::TupleAlreadyExists(_) => "tuple_already_exists",
            FgaError::TupleNotFound(_) => "tuple_not_found",
            FgaError::TupleWriteFailed(_) => "tuple_write_failed",
            FgaError::TupleDeleteFailed(_) => "tuple_delete_failed",
            FgaError::Configuration(_) => "configuration",
            FgaError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for FgaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured deadline on the error
            FgaError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            FgaError::Network(format!("malformed response body: {}", err))
        } else {
            FgaError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, FgaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(FgaError::Unavailable("no config".into()).is_recoverable());
        assert!(FgaError::Timeout(Duration::from_millis(10)).is_recoverable());
        assert!(FgaError::Remote {
            status: 503,
            code: "unavailable".into(),
            message: "down".into(),
        }
        .is_recoverable());
        assert!(!FgaError::Configuration("bad url".into()).is_recoverable());
        assert!(!FgaError::Internal(anyhow::anyhow!("boom")).is_recoverable());
    }
}
