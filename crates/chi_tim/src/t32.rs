//! Reading T32 textures.
//!
//! T32 files have no signature. The header is 224 bytes with the CLUT offset
//! stored at byte 12; the picture is always 128 pixels wide, 8 bits per pixel,
//! and stored as a column of swizzled 128x64 tiles followed by 256 bytes of
//! padding and a 256 entry CLUT.

use chi_buffer::{BinaryCursor, SeekMode};
use chi_gs::Bpp;
use std::io::{Read, Seek};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::picture::Picture;
use crate::tim::read_palette;
use crate::types::ImageType;

pub const WIDTH: u16 = 128;
pub const TILE_HEIGHT: usize = 64;
pub const CLUT_COLORS: u16 = 256;

const CLUT_OFFSET_POSITION: i64 = 12;
const HEADER_SIZE: i64 = 224;
const CLUT_PADDING: u32 = 256;

/// Reads a T32 texture starting `offset` bytes into `stream`
#[instrument(skip(stream), err)]
pub fn decode<S: Read + Seek>(stream: &mut S, offset: u64) -> Result<Picture> {
    let mut cursor = BinaryCursor::new(stream);
    cursor.seek(offset as i64 + CLUT_OFFSET_POSITION, SeekMode::Start)?;

    let clut_offset = cursor.read_u32_le()?;
    let image_size = clut_offset
        .checked_sub(CLUT_PADDING)
        .filter(|size| *size >= WIDTH as u32)
        .ok_or(Error::InvalidClutOffset(clut_offset))?;
    let rows = image_size / WIDTH as u32;
    let height = u16::try_from(rows).map_err(|_| Error::InvalidDimensions {
        width: WIDTH as u32,
        height: rows,
    })?;
    debug!(clut_offset, image_size, height, "read T32 header");

    cursor.seek(offset as i64 + HEADER_SIZE, SeekMode::Start)?;
    let image = cursor.read_bytes(image_size as usize)?;

    cursor.seek(CLUT_PADDING as i64, SeekMode::Current)?;
    let clut = cursor.read_bytes(CLUT_COLORS as usize * 4)?;
    let palette = read_palette(&clut);

    let width = WIDTH as usize;
    let tile_len = width * TILE_HEIGHT;

    let mut pixel_indices = Vec::with_capacity(image.len().next_multiple_of(tile_len));
    for tile in image.chunks(tile_len) {
        let linear = if tile.len() == tile_len {
            chi_gs::unswizzle(Bpp::Eight, tile, width, TILE_HEIGHT)?
        } else {
            let mut padded = tile.to_vec();
            padded.resize(tile_len, 0);
            chi_gs::unswizzle(Bpp::Eight, &padded, width, TILE_HEIGHT)?
        };
        pixel_indices.extend_from_slice(&linear);
    }
    pixel_indices.truncate(width * height as usize);

    Ok(Picture {
        width: WIDTH,
        height,
        image_type: ImageType::Indexed8,
        clut_colors: CLUT_COLORS,
        palette,
        pixel_indices,
        raw: Vec::new(),
    })
}
