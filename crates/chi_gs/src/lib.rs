//! Graphics Synthesizer memory transforms used by PS2 indexed textures.
//!
//! Textures are stored on disc in the order the GS expects them in local
//! memory rather than row-major. This crate converts between the two layouts
//! for 8 and 4 bits per pixel data, and implements the CLUT entry reordering
//! and 7-bit alpha scaling every indexed texture shares.
//!
//! ## Local memory layout
//!
//! | Unit   | Size                | PSMCT32 | PSMT8   | PSMT4    |
//! |--------|---------------------|---------|---------|----------|
//! | Page   | 32 blocks, 8 KiB    | 64x32   | 128x64  | 128x128  |
//! | Block  | 4 columns, 256 B    | 8x8     | 16x16   | 32x16    |
//! | Column | 16 words, 64 B      | 8x2     | 16x4    | 32x4     |
//!
//! Pixel data is only swizzled in whole pages, so 8bpp textures must be
//! multiples of 128x64 and 4bpp textures multiples of 128x128.
//!
//! ```
//! # fn doit() -> chi_gs::Result<()> {
//! use chi_gs::{swizzle, unswizzle, Bpp};
//!
//! let tiled = vec![0u8; 128 * 64];
//! let linear = unswizzle(Bpp::Eight, &tiled, 128, 64)?;
//! assert_eq!(swizzle(Bpp::Eight, &linear, 128, 64)?, tiled);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod error;
pub mod palette;
pub mod swizzle;
pub mod tables;

pub use error::{Error, Result};
pub use palette::{compress_alpha, expand_alpha, twiddle};
pub use swizzle::{pack_nibbles, swizzle, unpack_nibbles, unswizzle, Bpp};
