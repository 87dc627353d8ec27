//! This library handles reading and creating the **TIM2**, **TIM3** and **T32** indexed textures
//! used by PS2 games.
//!
//! # TIM2 / TIM3 Format Documentation
//!
//! TIM3 is a TIM2 container with a different signature whose pixel data is stored in GS memory
//! order (see [`chi_gs`]) once the picture is at least 128x128. All values are little-endian.
//!
//! ## File Header
//!
//! | Offset (bytes) | Field          | Description                                          |
//! |----------------|----------------|------------------------------------------------------|
//! | 0x0000         | Signature      | 4 bytes: `"TIM2"` or `"TIM3"`                        |
//! | 0x0004         | Format Version | 1 byte: 4 in files written by this crate             |
//! | 0x0005         | Format Id      | 1 byte: 0 for TIM2, 6 for TIM3                       |
//! | 0x0006         | Picture Count  | 2 bytes: Number of pictures that follow              |
//! | 0x0008         | Reserved       | 8 bytes                                              |
//!
//! ## Picture Header
//!
//! | Offset (bytes) | Field           | Description                                         |
//! |----------------|-----------------|-----------------------------------------------------|
//! | 0x0000         | Total Size      | 4 bytes: Header, image and CLUT size combined       |
//! | 0x0004         | CLUT Size       | 4 bytes: Size of the CLUT in bytes                  |
//! | 0x0008         | Image Size      | 4 bytes: Size of the image data in bytes            |
//! | 0x000C         | Header Size     | 2 bytes: 48 unless mipmaps or user data follow      |
//! | 0x000E         | CLUT Colors     | 2 bytes: Number of colors in use                    |
//! | 0x0010         | Picture Format  | 1 byte: Always 0                                    |
//! | 0x0011         | Mipmap Textures | 1 byte: 1 for a single level                        |
//! | 0x0012         | CLUT Type       | 1 byte: 3 for 32-bit RGBA entries                   |
//! | 0x0013         | Image Type      | 1 byte: 1-3 direct color, 4 for 4bpp, 5 for 8bpp    |
//! | 0x0014         | Width           | 2 bytes                                             |
//! | 0x0016         | Height          | 2 bytes                                             |
//! | 0x0018         | GS TEX0         | 8 bytes: See [`gs::GsTex0`]                         |
//! | 0x0020         | GS TEX1         | 8 bytes: Always 0x260                               |
//! | 0x0028         | GS Regs         | 4 bytes: Always 0                                   |
//! | 0x002C         | GS TEXCLUT      | 4 bytes: Always 0                                   |
//!
//! The image data follows the header, then the CLUT. CLUT entries are 4 bytes of R, G, B and a
//! 7-bit alpha where 0x80 is opaque. CLUTs of 32 entries or more are stored twiddled, see
//! [`chi_gs::twiddle`].
//!
//! # T32
//!
//! T32 is a headless variant, see [`t32`].
//!
//! ```
//! # fn doit() -> chi_tim::error::Result<()> {
//! use chi_gs::Bpp;
//! use chi_tim::{EncodeOptions, IndexedImage, Rgba};
//!
//! let image = IndexedImage {
//!     width: 2,
//!     height: 2,
//!     indices: vec![0, 1, 1, 0],
//!     palette: vec![Rgba::new(0, 0, 0, 0xFF), Rgba::new(0xFF, 0xFF, 0xFF, 0xFF)],
//! };
//!
//! let bytes = chi_tim::encode(&image, Bpp::Four, &EncodeOptions::default())?;
//! let picture = chi_tim::decode(&mut std::io::Cursor::new(bytes), 0)?;
//! assert_eq!(picture.pixel_indices, image.indices);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod error;
pub mod gs;
pub mod picture;
pub mod png;
pub mod t32;
pub mod tim;
pub mod types;

pub use picture::{IndexedImage, Picture, Rgba};
pub use tim::{decode, encode, EncodeOptions, TimFlavor, TimImage};
pub use types::ImageType;
