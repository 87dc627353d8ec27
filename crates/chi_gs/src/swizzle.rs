//! Conversion between linear index buffers and GS local memory order.
//!
//! Swizzled textures are uploaded to the GS as PSMCT32 data and sampled as
//! PSMT8 or PSMT4. Recovering the linear layout means writing the bytes through
//! the 32-bit path and reading them back through the indexed path; swizzling
//! runs the same two passes in the opposite direction.

use tracing::instrument;

use crate::error::{Error, Result};
use crate::tables::{
    BLOCK32, BLOCK4, BLOCK8, COLUMN_BYTE4, COLUMN_BYTE8, COLUMN_WORD32, COLUMN_WORD4,
    COLUMN_WORD8,
};

const PAGE_WORDS: usize = 2048;
const BLOCK_WORDS: usize = 64;
const COLUMN_WORDS: usize = 16;

/// Bits per pixel of an indexed texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bpp {
    /// PSMT4, two indices per byte with the low nibble first
    Four,
    /// PSMT8, one index per byte
    Eight,
}

impl Bpp {
    pub const fn bits(self) -> u8 {
        match self {
            Bpp::Four => 4,
            Bpp::Eight => 8,
        }
    }

    /// Largest palette addressable by this depth
    pub const fn max_colors(self) -> usize {
        match self {
            Bpp::Four => 16,
            Bpp::Eight => 256,
        }
    }

    /// Number of bytes a `width` by `height` image occupies
    pub const fn packed_len(self, width: usize, height: usize) -> usize {
        match self {
            Bpp::Four => (width * height).div_ceil(2),
            Bpp::Eight => width * height,
        }
    }

    /// Whether the dimensions fill whole GS pages in this storage mode
    pub const fn is_aligned(self, width: usize, height: usize) -> bool {
        let page_height = match self {
            Bpp::Four => 128,
            Bpp::Eight => 64,
        };
        width != 0 && height != 0 && width % 128 == 0 && height % page_height == 0
    }
}

impl TryFrom<u8> for Bpp {
    type Error = u8;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        match value {
            4 => Ok(Bpp::Four),
            8 => Ok(Bpp::Eight),
            other => Err(other),
        }
    }
}

/// Scratch GS memory sized for a single texture
struct LocalMemory {
    bytes: Vec<u8>,
}

impl LocalMemory {
    fn new(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len],
        }
    }

    /// Byte address of a PSMCT32 pixel
    fn psmct32_address(x: usize, y: usize, dbw: usize) -> usize {
        let page = x / 64 + (y / 32) * dbw;
        let (px, py) = (x % 64, y % 32);

        let block = BLOCK32[px / 8 + (py / 8) * 8] as usize;
        let (bx, by) = (px % 8, py % 8);

        let column = by / 2;
        let word = COLUMN_WORD32[bx + (by % 2) * 8] as usize;

        (page * PAGE_WORDS + block * BLOCK_WORDS + column * COLUMN_WORDS + word) * 4
    }

    /// Byte address of a PSMT8 pixel; `dbw` is in 64 pixel units
    fn psmt8_address(x: usize, y: usize, dbw: usize) -> usize {
        let dbw = dbw >> 1;
        let page = x / 128 + (y / 64) * dbw;
        let (px, py) = (x % 128, y % 64);

        let block = BLOCK8[px / 16 + (py / 16) * 8] as usize;
        let (bx, by) = (px % 16, py % 16);

        let column = by / 4;
        let index = bx + (by % 4) * 16;
        let word = COLUMN_WORD8[column & 1][index] as usize;
        let byte = COLUMN_BYTE8[index] as usize;

        (page * PAGE_WORDS + block * BLOCK_WORDS + column * COLUMN_WORDS + word) * 4 + byte
    }

    /// Byte address and nibble (0 low, 1 high) of a PSMT4 pixel
    fn psmt4_address(x: usize, y: usize, dbw: usize) -> (usize, u32) {
        let dbw = dbw >> 1;
        let page = x / 128 + (y / 128) * dbw;
        let (px, py) = (x % 128, y % 128);

        let block = BLOCK4[px / 32 + (py / 16) * 4] as usize;
        let (bx, by) = (px % 32, py % 16);

        let column = by / 4;
        let index = bx + (by % 4) * 32;
        let word = COLUMN_WORD4[column & 1][index] as usize;
        let lane = COLUMN_BYTE4[index] as usize;

        let address = (page * PAGE_WORDS + block * BLOCK_WORDS + column * COLUMN_WORDS + word)
            * 4
            + (lane >> 1);
        (address, (lane & 1) as u32)
    }

    fn write_psmct32(&mut self, dbw: usize, width: usize, height: usize, data: &[u8]) {
        let mut pixels = data.chunks_exact(4);
        for y in 0..height {
            for x in 0..width {
                let Some(pixel) = pixels.next() else {
                    return;
                };
                let address = Self::psmct32_address(x, y, dbw);
                self.bytes[address..address + 4].copy_from_slice(pixel);
            }
        }
    }

    fn read_psmct32(&self, dbw: usize, width: usize, height: usize, out: &mut [u8]) {
        let mut pixels = out.chunks_exact_mut(4);
        for y in 0..height {
            for x in 0..width {
                let Some(pixel) = pixels.next() else {
                    return;
                };
                let address = Self::psmct32_address(x, y, dbw);
                pixel.copy_from_slice(&self.bytes[address..address + 4]);
            }
        }
    }

    fn write_psmt8(&mut self, dbw: usize, width: usize, height: usize, data: &[u8]) {
        let mut pixels = data.iter();
        for y in 0..height {
            for x in 0..width {
                let Some(&pixel) = pixels.next() else {
                    return;
                };
                self.bytes[Self::psmt8_address(x, y, dbw)] = pixel;
            }
        }
    }

    fn read_psmt8(&self, dbw: usize, width: usize, height: usize, out: &mut [u8]) {
        let mut pixels = out.iter_mut();
        for y in 0..height {
            for x in 0..width {
                let Some(pixel) = pixels.next() else {
                    return;
                };
                *pixel = self.bytes[Self::psmt8_address(x, y, dbw)];
            }
        }
    }

    fn write_psmt4(&mut self, dbw: usize, width: usize, height: usize, data: &[u8]) {
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let value = (data[i / 2] >> ((i & 1) * 4)) & 0x0F;

                let (address, nibble) = Self::psmt4_address(x, y, dbw);
                let shift = nibble * 4;
                let byte = &mut self.bytes[address];
                *byte = (*byte & !(0x0Fu8 << shift)) | (value << shift);
            }
        }
    }

    fn read_psmt4(&self, dbw: usize, width: usize, height: usize, out: &mut [u8]) {
        for y in 0..height {
            for x in 0..width {
                let (address, nibble) = Self::psmt4_address(x, y, dbw);
                let value = (self.bytes[address] >> (nibble * 4)) & 0x0F;

                let i = y * width + x;
                let shift = (i & 1) * 4;
                let byte = &mut out[i / 2];
                *byte = (*byte & !(0x0Fu8 << shift)) | (value << shift);
            }
        }
    }
}

fn validate(bpp: Bpp, data: &[u8], width: usize, height: usize) -> Result<()> {
    if !bpp.is_aligned(width, height) {
        return Err(Error::UnalignedDimensions { bpp, width, height });
    }

    let expected = bpp.packed_len(width, height);
    if data.len() != expected {
        return Err(Error::BufferSize {
            expected,
            actual: data.len(),
        });
    }

    Ok(())
}

/// Geometry of the PSMCT32 view over the same bytes
fn psmct32_view(bpp: Bpp, width: usize, height: usize) -> (usize, usize, usize) {
    let rrw = width / 2;
    let rrh = match bpp {
        Bpp::Four => height / 4,
        Bpp::Eight => height / 2,
    };
    (rrw / 64, rrw, rrh)
}

/// Converts GS ordered pixel data into a linear buffer.
///
/// For [`Bpp::Four`] both the input and output are packed two indices per
/// byte, low nibble first; use [`unpack_nibbles`] to get one index per pixel.
#[instrument(skip(data), err)]
pub fn unswizzle(bpp: Bpp, data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    validate(bpp, data, width, height)?;

    let mut memory = LocalMemory::new(data.len());
    let (dbw, rrw, rrh) = psmct32_view(bpp, width, height);
    memory.write_psmct32(dbw, rrw, rrh, data);

    let mut out = vec![0u8; data.len()];
    match bpp {
        Bpp::Four => memory.read_psmt4(width / 64, width, height, &mut out),
        Bpp::Eight => memory.read_psmt8(width / 64, width, height, &mut out),
    }
    Ok(out)
}

/// Converts a linear buffer into GS order, the inverse of [`unswizzle`].
///
/// 4bpp input must already be packed with [`pack_nibbles`].
#[instrument(skip(data), err)]
pub fn swizzle(bpp: Bpp, data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    validate(bpp, data, width, height)?;

    let mut memory = LocalMemory::new(data.len());
    match bpp {
        Bpp::Four => memory.write_psmt4(width / 64, width, height, data),
        Bpp::Eight => memory.write_psmt8(width / 64, width, height, data),
    }

    let mut out = vec![0u8; data.len()];
    let (dbw, rrw, rrh) = psmct32_view(bpp, width, height);
    memory.read_psmct32(dbw, rrw, rrh, &mut out);
    Ok(out)
}

/// Packs one index per byte into two per byte, low nibble first.
///
/// A trailing odd index leaves the high nibble of the last byte empty.
pub fn pack_nibbles(indices: &[u8]) -> Vec<u8> {
    indices
        .chunks(2)
        .map(|pair| match pair {
            [low, high] => (high << 4) | (low & 0x0F),
            [low] => low & 0x0F,
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

/// Expands packed 4bpp data into one index per byte, low nibble first
pub fn unpack_nibbles(packed: &[u8]) -> Vec<u8> {
    packed
        .iter()
        .flat_map(|byte| [byte & 0x0F, byte >> 4])
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::swizzle::{pack_nibbles, swizzle, unpack_nibbles, unswizzle, Bpp};

    #[test]
    fn unswizzle8_places_first_words() -> Result<()> {
        let mut data = vec![0u8; 128 * 64];
        data[0] = 0x01;
        data[2] = 0x05;
        data[4] = 0x02;
        data[8] = 0x04;
        data[256] = 0x03;

        let linear = unswizzle(Bpp::Eight, &data, 128, 64)?;

        assert_eq!(linear[0], 0x01);
        assert_eq!(linear[1], 0x02);
        assert_eq!(linear[2], 0x04);
        assert_eq!(linear[8], 0x05);
        assert_eq!(linear[128], 0x03);
        assert_eq!(linear.iter().filter(|&&b| b != 0).count(), 5);

        Ok(())
    }

    #[test]
    fn unswizzle4_places_first_nibbles() -> Result<()> {
        let mut data = vec![0u8; 128 * 128 / 2];
        data[0] = 0x21;
        data[1] = 0x0A;
        data[4] = 0x03;
        data[16] = 0x70;

        let linear = unswizzle(Bpp::Four, &data, 128, 128)?;

        assert_eq!(linear[0], 0x31);
        assert_eq!(linear[4], 0x0A);
        assert_eq!(linear[128], 0x07);

        Ok(())
    }

    #[test]
    fn swizzle_reverses_unswizzle() -> Result<()> {
        let data = (0..256 * 128).map(|i| (i * 7 % 251) as u8).collect::<Vec<_>>();

        let linear = unswizzle(Bpp::Eight, &data, 256, 128)?;
        assert_eq!(swizzle(Bpp::Eight, &linear, 256, 128)?, data);

        let packed = &data[..256 * 128 / 2];
        let linear = unswizzle(Bpp::Four, packed, 256, 128)?;
        assert_eq!(swizzle(Bpp::Four, &linear, 256, 128)?, packed);

        Ok(())
    }

    #[test]
    fn rejects_unaligned_dimensions() {
        assert_eq!(
            unswizzle(Bpp::Eight, &[0; 64 * 64], 64, 64),
            Err(Error::UnalignedDimensions {
                bpp: Bpp::Eight,
                width: 64,
                height: 64
            })
        );
        assert_eq!(
            swizzle(Bpp::Four, &[0; 128 * 64 / 2], 128, 64),
            Err(Error::UnalignedDimensions {
                bpp: Bpp::Four,
                width: 128,
                height: 64
            })
        );
        assert_eq!(
            unswizzle(Bpp::Eight, &[0; 16], 128, 64),
            Err(Error::BufferSize {
                expected: 128 * 64,
                actual: 16
            })
        );
    }

    #[test]
    fn nibbles_are_low_first() {
        assert_eq!(pack_nibbles(&[0x1, 0x2, 0xF, 0x0, 0x5]), vec![0x21, 0x0F, 0x05]);
        assert_eq!(unpack_nibbles(&[0x21, 0x0F]), vec![0x1, 0x2, 0xF, 0x0]);
    }
}
