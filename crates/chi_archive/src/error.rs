//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`chi_buffer::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    BufferError(#[from] chi_buffer::Error),

    /// Transparent wrapper for [`serde_json::Error`]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// file is not a TM3 archive, signature expected at {pos:#X}
    #[error("file is not a TM3 archive, signature expected at {pos:#X}")]
    SignatureMismatch { pos: u64 },

    /// operation was cancelled
    #[error("operation was cancelled")]
    OperationCancelled,

    /// entry {index} has offset {offset:#X} which is outside of the archive region
    #[error("entry {index} has offset {offset:#X} which is outside of the archive region")]
    InvalidOffset { index: usize, offset: u32 },

    /// unable to find requested entry at index {0}
    #[error("unable to find requested entry at index {0}")]
    EntryNotFound(usize),

    /// entry {0} is a null entry and has no data
    #[error("entry {0} is a null entry and has no data")]
    NullEntry(usize),

    /// {0:?} is not a valid entry tag
    #[error("{0:?} is not a valid entry tag")]
    #[diagnostic(help("DAT types are 4 characters, TM3 names at most 8, all below U+0100"))]
    InvalidTag(String),

    /// TM3 archives cannot contain null entries
    #[error("TM3 archives cannot contain null entries")]
    NullEntryNotSupported,

    /// archive grew past the 4 GiB addressable by its offsets
    #[error("archive grew past the 4 GiB addressable by its offsets")]
    ArchiveTooLarge,

    /// invalid manifest: {0}
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
