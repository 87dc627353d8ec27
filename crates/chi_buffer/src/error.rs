//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// seek to {0} resolves before the start of the stream
    #[error("seek to {0} resolves before the start of the stream")]
    InvalidSeek(i64),

    /// stream ended after {actual} of {expected} bytes
    #[error("stream ended after {actual} of {expected} bytes")]
    ShortCopy { expected: u64, actual: u64 },

    /// stream ended after {actual} of {expected} bytes
    #[error("stream ended after {actual} of {expected} bytes")]
    ShortRead { expected: u64, actual: u64 },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
