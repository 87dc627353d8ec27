//! In-memory picture representation.
//!
//! Pixel indices are always linear and palettes always in display order; the
//! swizzle and CLUT twiddle only exist on the wire.

use crate::error::{Error, Result};
use crate::types::ImageType;

/// A palette entry with 8-bit alpha
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Reads a wire entry, expanding its 7-bit alpha
    pub const fn from_wire(bytes: [u8; 4]) -> Self {
        Self::new(
            bytes[0],
            bytes[1],
            bytes[2],
            chi_gs::expand_alpha(bytes[3]),
        )
    }

    /// Wire bytes with the alpha compressed to 7 bits
    pub const fn to_wire(self) -> [u8; 4] {
        [self.r, self.g, self.b, chi_gs::compress_alpha(self.a)]
    }
}

/// A single decoded picture
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub width: u16,
    pub height: u16,
    pub image_type: ImageType,

    /// Number of colors the header declares
    pub clut_colors: u16,

    /// Display ordered palette; empty for direct color pictures
    pub palette: Vec<Rgba>,

    /// One linear index per pixel; empty for direct color pictures
    pub pixel_indices: Vec<u8>,

    /// Untouched image bytes of direct color pictures
    pub raw: Vec<u8>,
}

impl Picture {
    /// Palette index of the pixel at `(x, y)`
    pub fn index_at(&self, x: u16, y: u16) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixel_indices
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Renders the picture as RGBA8 pixels in row-major order
    pub fn to_rgba(&self) -> Result<Vec<u8>> {
        if self.image_type.is_indexed() {
            let mut out = Vec::with_capacity(self.pixel_indices.len() * 4);
            for &index in &self.pixel_indices {
                let color = self
                    .palette
                    .get(index as usize)
                    .ok_or(Error::IndexOutOfPalette {
                        index,
                        colors: self.palette.len(),
                    })?;
                out.extend_from_slice(&[color.r, color.g, color.b, color.a]);
            }
            return Ok(out);
        }

        let pixels = self.width as usize * self.height as usize;
        let mut out = Vec::with_capacity(pixels * 4);
        match self.image_type {
            ImageType::Direct16 => {
                for value in self.raw.chunks_exact(2).take(pixels) {
                    let value = u16::from_le_bytes([value[0], value[1]]);
                    let expand = |v: u16| ((v & 0x1F) as u8) << 3 | ((v & 0x1F) as u8) >> 2;
                    out.extend_from_slice(&[
                        expand(value),
                        expand(value >> 5),
                        expand(value >> 10),
                        if value & 0x8000 != 0 { 0xFF } else { 0x00 },
                    ]);
                }
            }
            ImageType::Direct24 => {
                for value in self.raw.chunks_exact(3).take(pixels) {
                    out.extend_from_slice(&[value[0], value[1], value[2], 0xFF]);
                }
            }
            ImageType::Direct32 => {
                for value in self.raw.chunks_exact(4).take(pixels) {
                    out.extend_from_slice(&[
                        value[0],
                        value[1],
                        value[2],
                        chi_gs::expand_alpha(value[3]),
                    ]);
                }
            }
            ImageType::Indexed4 | ImageType::Indexed8 => unreachable!("handled above"),
        }
        Ok(out)
    }

    /// Lossless view as an indexed image, failing for direct color pictures
    pub fn to_indexed(&self) -> Result<IndexedImage> {
        if !self.image_type.is_indexed() {
            return Err(Error::NotIndexedImage);
        }
        Ok(IndexedImage {
            width: self.width as u32,
            height: self.height as u32,
            indices: self.pixel_indices.clone(),
            palette: self.palette.clone(),
        })
    }
}

/// Row-major indexed raster with an RGBA palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    pub indices: Vec<u8>,
    pub palette: Vec<Rgba>,
}

impl IndexedImage {
    /// Checks the invariants the encoder relies on
    pub fn validate(&self) -> Result<()> {
        if self.width == 0
            || self.height == 0
            || self.width > u16::MAX as u32
            || self.height > u16::MAX as u32
        {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let expected = self.width as usize * self.height as usize;
        if self.indices.len() != expected {
            return Err(Error::ImageSizeMismatch {
                declared: self.indices.len(),
                expected,
            });
        }

        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= self.palette.len())
        {
            return Err(Error::IndexOutOfPalette {
                index,
                colors: self.palette.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::picture::{IndexedImage, Picture, Rgba};
    use crate::types::ImageType;

    fn checker() -> Picture {
        Picture {
            width: 2,
            height: 2,
            image_type: ImageType::Indexed4,
            clut_colors: 2,
            palette: vec![Rgba::new(0, 0, 0, 0xFF), Rgba::new(0xFF, 0x80, 0x10, 0x40)],
            pixel_indices: vec![0, 1, 1, 0],
            raw: Vec::new(),
        }
    }

    #[test]
    fn wire_alpha() {
        assert_eq!(
            Rgba::from_wire([1, 2, 3, 0x80]),
            Rgba::new(1, 2, 3, 0xFF)
        );
        assert_eq!(Rgba::new(1, 2, 3, 0xFF).to_wire(), [1, 2, 3, 0x80]);
    }

    #[test]
    fn render_indexed() -> Result<()> {
        let picture = checker();

        #[rustfmt::skip]
        let expected = vec![
            0x00, 0x00, 0x00, 0xFF,  0xFF, 0x80, 0x10, 0x40,
            0xFF, 0x80, 0x10, 0x40,  0x00, 0x00, 0x00, 0xFF,
        ];
        assert_eq!(picture.to_rgba()?, expected);
        assert_eq!(picture.index_at(1, 0), Some(1));
        assert_eq!(picture.index_at(2, 0), None);

        Ok(())
    }

    #[test]
    fn render_direct16() -> Result<()> {
        let picture = Picture {
            width: 2,
            height: 1,
            image_type: ImageType::Direct16,
            clut_colors: 0,
            palette: Vec::new(),
            pixel_indices: Vec::new(),
            raw: vec![0x1F, 0x80, 0x00, 0x7C],
        };

        assert_eq!(
            picture.to_rgba()?,
            vec![0xFF, 0x00, 0x00, 0xFF, 0x00, 0x00, 0xFF, 0x00]
        );
        assert!(matches!(picture.to_indexed(), Err(Error::NotIndexedImage)));

        Ok(())
    }

    #[test]
    fn validate_rejects_stray_index() {
        let image = IndexedImage {
            width: 2,
            height: 1,
            indices: vec![0, 3],
            palette: vec![Rgba::default(); 2],
        };

        assert!(matches!(
            image.validate(),
            Err(Error::IndexOutOfPalette { index: 3, colors: 2 })
        ));
    }
}
