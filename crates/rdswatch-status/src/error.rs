use thiserror::Error;

/// Closed set of fetch outcomes the caller pattern-matches on. Every
/// variant degrades to a sentinel record at the call site — the report
/// must still send so a human sees the failure.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The configured identifier names no instance in this account/region.
    #[error("RDS instance '{0}' not found")]
    NotFound(String),

    /// Request never completed: timeout or connection-level failure.
    #[error("transient AWS error: {0}")]
    Transient(String),

    /// The control plane answered with an error (auth, throttling,
    /// malformed request).
    #[error("AWS API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, StatusError>;
