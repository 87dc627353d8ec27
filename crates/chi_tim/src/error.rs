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

    /// Transparent wrapper for [`chi_gs::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    SwizzleError(#[from] chi_gs::Error),

    /// signature {found:#010X} is not a known texture signature
    #[error("signature {found:#010X} is not a known texture signature")]
    SignatureMismatch { found: u32 },

    /// palette has {colors} colors but at most {max} fit
    #[error("palette has {colors} colors but at most {max} fit")]
    #[diagnostic(help("reduce the number of colors in the source image"))]
    PaletteTooLarge { colors: usize, max: usize },

    /// source image is not an indexed color image
    #[error("source image is not an indexed color image")]
    #[diagnostic(help("convert the image to an 8-bit paletted PNG first"))]
    NotIndexedImage,

    /// pixel index {index} is outside a palette of {colors} colors
    #[error("pixel index {index} is outside a palette of {colors} colors")]
    IndexOutOfPalette { index: u8, colors: usize },

    /// {width}x{height} is not a valid texture size
    #[error("{width}x{height} is not a valid texture size")]
    InvalidDimensions { width: u32, height: u32 },

    /// picture declares {declared} bytes of image data but {expected} are needed
    #[error("picture declares {declared} bytes of image data but {expected} are needed")]
    ImageSizeMismatch { declared: usize, expected: usize },

    /// T32 header declares a CLUT offset of {0}
    #[error("T32 header declares a CLUT offset of {0}")]
    InvalidClutOffset(u32),

    /// file contains no pictures
    #[error("file contains no pictures")]
    NoPictures,

    /// Transparent wrapper for [`png::DecodingError`]
    #[error(transparent)]
    PngDecodingError(#[from] png::DecodingError),

    /// Transparent wrapper for [`png::EncodingError`]
    #[error(transparent)]
    PngEncodingError(#[from] png::EncodingError),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
