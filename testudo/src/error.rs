//! Error handling.

use crate::parse::error::Diagnostic;
use std::io;

/// Type alias for `Result` with default `Error`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that are raised by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input could not be recognized.
    #[error("{0}")]
    Parse(#[from] Diagnostic),
    /// Error from writing to the output sink.
    #[error("Target error: {0}")]
    FromIo(#[from] io::Error),
}
