//! Seekable byte cursor shared by the archive and texture codecs.
//!
//! Every multi-byte value in the supported formats is little-endian, but a few
//! auxiliary structures embedded in entries are big-endian, so both variants
//! are exposed explicitly. Fixed width strings are returned raw.

pub mod cursor;
pub mod error;

pub use cursor::{BinaryCursor, SeekMode};
pub use error::{Error, Result};
