//! Error taxonomy.
//!
//! `FuzzError` is the only error type that propagates out of `generate()`
//! or `run_scan()`. Every other failure (`ProbeError`) is captured
//! per-payload inside `ScanResult.errors[]` and never unwinds the driver.

use thiserror::Error;

/// Fatal errors: configuration problems, cancellation, and the one oracle
/// misconfiguration (`OracleUndecided`) that must propagate before any I/O
/// happens.
#[derive(Debug, Error)]
pub enum FuzzError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scan cancelled")]
    Cancelled,

    #[error("oracle undecided: http-url mode requires a --pattern to classify 200 responses")]
    OracleUndecided,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Per-payload transport/protocol failure, captured in `ScanResult.errors[]`
/// rather than propagated. Distinct from `FuzzError`: these never stop a
/// scan unless `continue_on_error` is false and the kind is connection-related.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ProbeError {
    #[error("connection refused")]
    Refused,
    #[error("connection timed out")]
    Timeout,
    #[error("connection reset")]
    Reset,
    #[error("tls handshake failed: {0}")]
    TlsHandshake(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("dns resolution failed: {0}")]
    Dns(String),
}

impl ProbeError {
    /// Whether this error kind counts as "connection" for the driver's
    /// `!continue_on_error` short-circuit.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ProbeError::Refused | ProbeError::Reset | ProbeError::Dns(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_flagged() {
        assert!(ProbeError::Refused.is_connection_error());
        assert!(ProbeError::Reset.is_connection_error());
        assert!(ProbeError::Dns("x".into()).is_connection_error());
        assert!(!ProbeError::Timeout.is_connection_error());
        assert!(!ProbeError::Protocol("x".into()).is_connection_error());
    }
}
