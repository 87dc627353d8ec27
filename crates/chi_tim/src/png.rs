//! Conversion between pictures and PNG images

use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{Read, Write};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::picture::{IndexedImage, Picture, Rgba};

/// Reads a paletted PNG without any color conversion.
///
/// Sub-byte bit depths are expanded to one index per pixel. Palette entries
/// without a tRNS value are opaque.
#[instrument(skip(reader), err)]
pub fn read_indexed<R: Read>(reader: R) -> Result<IndexedImage> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    if frame.color_type != ColorType::Indexed {
        return Err(Error::NotIndexedImage);
    }

    let info = reader.info();
    let rgb = info.palette.as_deref().ok_or(Error::NotIndexedImage)?;
    let alpha = info.trns.as_deref().unwrap_or_default();
    let palette = rgb
        .chunks_exact(3)
        .enumerate()
        .map(|(i, c)| Rgba::new(c[0], c[1], c[2], alpha.get(i).copied().unwrap_or(0xFF)))
        .collect::<Vec<_>>();

    let bits = frame.bit_depth as usize;
    let width = frame.width as usize;
    let mask = ((1u16 << bits) - 1) as u8;

    let mut indices = Vec::with_capacity(width * frame.height as usize);
    for row in buf[..frame.buffer_size()].chunks_exact(frame.line_size) {
        for x in 0..width {
            let bit = x * bits;
            let shift = 8 - bits - bit % 8;
            indices.push((row[bit / 8] >> shift) & mask);
        }
    }
    debug!(
        width = frame.width,
        height = frame.height,
        colors = palette.len(),
        "read indexed png"
    );

    Ok(IndexedImage {
        width: frame.width,
        height: frame.height,
        indices,
        palette,
    })
}

/// Writes an 8-bit paletted PNG
#[instrument(skip(image, writer), fields(width = image.width, height = image.height), err)]
pub fn write_indexed<W: Write>(image: &IndexedImage, writer: W) -> Result<()> {
    let mut encoder = Encoder::new(writer, image.width, image.height);
    encoder.set_color(ColorType::Indexed);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_palette(
        image
            .palette
            .iter()
            .flat_map(|c| [c.r, c.g, c.b])
            .collect::<Vec<_>>(),
    );
    encoder.set_trns(image.palette.iter().map(|c| c.a).collect::<Vec<_>>());

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.indices)?;
    writer.finish()?;
    Ok(())
}

/// Writes a decoded picture, paletted when it is indexed and RGBA otherwise
pub fn write_picture<W: Write>(picture: &Picture, writer: W) -> Result<()> {
    if picture.image_type.is_indexed() {
        return write_indexed(&picture.to_indexed()?, writer);
    }

    let mut encoder = Encoder::new(writer, picture.width as u32, picture.height as u32);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&picture.to_rgba()?)?;
    writer.finish()?;
    Ok(())
}
