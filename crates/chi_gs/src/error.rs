//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::swizzle::Bpp;

/// Error type for library
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum Error {
    /// {width}x{height} is not aligned to the {bpp:?} page size
    #[error("{width}x{height} is not aligned to the {bpp:?} page size")]
    #[diagnostic(help("8bpp textures need width % 128 == 0 and height % 64 == 0, 4bpp textures need both % 128 == 0"))]
    UnalignedDimensions { bpp: Bpp, width: usize, height: usize },

    /// expected {expected} bytes of pixel data but got {actual}
    #[error("expected {expected} bytes of pixel data but got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
