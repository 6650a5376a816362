//! Error types for tuicore.

use std::io;

/// Error type for tuicore operations.
#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    /// I/O error talking to the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal operation failed (raw mode, size query, ...).
    #[error("terminal error: {0}")]
    Terminal(String),

    /// A component returned a line wider than the terminal during an
    /// incremental render. This is always a bug in the offending
    /// component, never a recoverable condition.
    #[error("render overflow: {0}")]
    Overflow(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for tuicore operations.
pub type Result<T> = std::result::Result<T, TuiError>;
