//! Reading and writing TIM2 and TIM3 containers

use binrw::{BinRead, BinWrite};
use bon::Builder;
use chi_buffer::{BinaryCursor, SeekMode};
use chi_gs::Bpp;
use std::io::{Cursor, Read, Seek};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::gs::GsTex0;
use crate::picture::{IndexedImage, Picture, Rgba};
use crate::types::{FileHeader, ImageType, PictureHeader, PICTURE_HEADER_SIZE};

/// `"TIM2"` as a little endian integer
pub const TIM2_SIGNATURE: u32 = 0x324D4954;

/// `"TIM3"` as a little endian integer
pub const TIM3_SIGNATURE: u32 = 0x334D4954;

const GS_TEX1: u64 = 0x260;
const CLUT_TYPE_RGBA32: u8 = 3;

/// Container flavors sharing the TIM2 layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimFlavor {
    /// Pixel data is always stored linearly
    Tim2,
    /// Pixel data of pictures at least 128x128 is stored swizzled
    Tim3,
}

impl TimFlavor {
    pub const fn signature(self) -> u32 {
        match self {
            TimFlavor::Tim2 => TIM2_SIGNATURE,
            TimFlavor::Tim3 => TIM3_SIGNATURE,
        }
    }

    pub const fn from_signature(signature: u32) -> Option<Self> {
        match signature {
            TIM2_SIGNATURE => Some(TimFlavor::Tim2),
            TIM3_SIGNATURE => Some(TimFlavor::Tim3),
            _ => None,
        }
    }

    /// Format id written into new files
    pub const fn format_id(self) -> u8 {
        match self {
            TimFlavor::Tim2 => 0,
            TimFlavor::Tim3 => 6,
        }
    }

    /// Whether pixel data of this size is stored in GS order
    pub const fn swizzles(self, width: usize, height: usize) -> bool {
        match self {
            TimFlavor::Tim2 => false,
            TimFlavor::Tim3 => width >= 128 && height >= 128,
        }
    }
}

/// A decoded TIM2 or TIM3 file
#[derive(Debug, Clone, PartialEq)]
pub struct TimImage {
    pub flavor: TimFlavor,
    pub format_version: u8,
    pub format_id: u8,
    pub pictures: Vec<Picture>,
}

impl TimImage {
    /// Reads a TIM2 or TIM3 file starting `offset` bytes into `stream`
    #[instrument(skip(stream), err)]
    pub fn decode<S: Read + Seek>(stream: &mut S, offset: u64) -> Result<TimImage> {
        let mut cursor = BinaryCursor::new(stream);
        cursor.seek(offset as i64, SeekMode::Start)?;

        let header = FileHeader::read(&mut cursor)?;
        let flavor = TimFlavor::from_signature(header.signature).ok_or(Error::SignatureMismatch {
            found: header.signature,
        })?;
        debug!(?flavor, pictures = header.picture_count, "read file header");

        let mut pictures = Vec::with_capacity(header.picture_count as usize);
        for _ in 0..header.picture_count {
            pictures.push(decode_picture(&mut cursor, flavor)?);
        }

        Ok(TimImage {
            flavor,
            format_version: header.format_version,
            format_id: header.format_id,
            pictures,
        })
    }
}

/// Reads the first picture of a TIM2 or TIM3 file
pub fn decode<S: Read + Seek>(stream: &mut S, offset: u64) -> Result<Picture> {
    TimImage::decode(stream, offset)?
        .pictures
        .into_iter()
        .next()
        .ok_or(Error::NoPictures)
}

/// Converts wire CLUT bytes into a display ordered palette
pub(crate) fn read_palette(bytes: &[u8]) -> Vec<Rgba> {
    let wire = bytes
        .chunks_exact(4)
        .map(|entry| Rgba::from_wire([entry[0], entry[1], entry[2], entry[3]]))
        .collect::<Vec<_>>();
    chi_gs::twiddle(&wire)
}

fn decode_picture<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    flavor: TimFlavor,
) -> Result<Picture> {
    let start = cursor.position()?;
    let header = PictureHeader::read(cursor)?;
    debug!(?header, "read picture header");

    cursor.seek((start + header.header_size as u64) as i64, SeekMode::Start)?;
    let image = cursor.read_bytes(header.image_size as usize)?;

    // The CLUT table can be longer than the declared color count when the
    // palette was padded to a full 16 or 256 entries before twiddling.
    let clut_entries = (header.clut_colors as usize).max(header.clut_size as usize / 4);
    let clut = cursor.read_bytes(clut_entries * 4)?;
    let mut palette = read_palette(&clut);

    let width = header.width as usize;
    let height = header.height as usize;

    let (pixel_indices, raw) = match header.image_type.bpp() {
        Some(bpp) => {
            let expected = bpp.packed_len(width, height);
            if image.len() < expected {
                return Err(Error::ImageSizeMismatch {
                    declared: image.len(),
                    expected,
                });
            }

            let data = &image[..expected];
            let linear = if flavor.swizzles(width, height) {
                chi_gs::unswizzle(bpp, data, width, height)?
            } else {
                data.to_vec()
            };

            let mut indices = match bpp {
                Bpp::Four => chi_gs::unpack_nibbles(&linear),
                Bpp::Eight => linear,
            };
            indices.truncate(width * height);
            (indices, Vec::new())
        }
        None => {
            palette.clear();
            (Vec::new(), image)
        }
    };

    if header.image_type.is_indexed() {
        let declared = header.clut_colors as usize;
        let in_range = pixel_indices
            .iter()
            .all(|&index| (index as usize) < declared);
        if in_range {
            palette.truncate(declared);
        }
    }

    let next = start + header.total_size.max(header.header_size as u32) as u64;
    cursor.seek(next as i64, SeekMode::Start)?;

    Ok(Picture {
        width: header.width,
        height: header.height,
        image_type: header.image_type,
        clut_colors: header.clut_colors,
        palette,
        pixel_indices,
        raw,
    })
}

/// Options for how a texture should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct EncodeOptions {
    /// Container flavor, which also decides whether pixel data is swizzled
    #[builder(default = TimFlavor::Tim3)]
    pub flavor: TimFlavor,

    /// Declare the padded 16 or 256 color count in the header instead of the
    /// source palette size
    #[builder(default)]
    pub pad_clut_colors: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Encodes an indexed image as a single picture TIM2 or TIM3 file
#[instrument(skip(image), fields(width = image.width, height = image.height, colors = image.palette.len()), err)]
pub fn encode(image: &IndexedImage, bpp: Bpp, options: &EncodeOptions) -> Result<Vec<u8>> {
    let capacity = bpp.max_colors();
    if image.palette.len() > capacity {
        return Err(Error::PaletteTooLarge {
            colors: image.palette.len(),
            max: capacity,
        });
    }
    image.validate()?;

    let width = image.width as usize;
    let height = image.height as usize;

    let mut pixels = match bpp {
        Bpp::Four => chi_gs::pack_nibbles(&image.indices),
        Bpp::Eight => image.indices.clone(),
    };
    if options.flavor.swizzles(width, height) {
        pixels = chi_gs::swizzle(bpp, &pixels, width, height)?;
    }

    let mut colors = image.palette.clone();
    colors.resize(capacity, Rgba::new(0, 0, 0, 0));
    let clut = chi_gs::twiddle(&colors)
        .into_iter()
        .flat_map(Rgba::to_wire)
        .collect::<Vec<_>>();

    let clut_colors = if options.pad_clut_colors {
        capacity
    } else {
        image.palette.len()
    };

    let file_header = FileHeader {
        signature: options.flavor.signature(),
        format_version: 4,
        format_id: options.flavor.format_id(),
        picture_count: 1,
        reserved: [0; 8],
    };

    let picture_header = PictureHeader {
        total_size: (clut.len() + pixels.len()) as u32 + PICTURE_HEADER_SIZE as u32,
        clut_size: clut.len() as u32,
        image_size: pixels.len() as u32,
        header_size: PICTURE_HEADER_SIZE,
        clut_colors: clut_colors as u16,
        picture_format: 0,
        mipmap_textures: 1,
        clut_type: CLUT_TYPE_RGBA32,
        image_type: ImageType::from(bpp),
        width: image.width as u16,
        height: image.height as u16,
        gs_tex0: GsTex0::for_indexed(bpp, image.width, image.height).into(),
        gs_tex1: GS_TEX1,
        gs_regs: 0,
        gs_tex_clut: 0,
    };

    let mut out = Cursor::new(Vec::with_capacity(
        16 + picture_header.total_size as usize,
    ));
    file_header.write(&mut out)?;
    picture_header.write(&mut out)?;

    let mut cursor = BinaryCursor::new(out);
    cursor.write_bytes(&pixels)?;
    cursor.write_bytes(&clut)?;

    Ok(cursor.into_inner().into_inner())
}

#[cfg(test)]
mod test {
    use chi_gs::Bpp;
    use pretty_assertions::{assert_eq, assert_str_eq};
    use std::io::Cursor;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::picture::{IndexedImage, Rgba};
    use crate::tim::{decode, encode, EncodeOptions, TimFlavor, TimImage};

    fn gradient(width: u32, height: u32, colors: usize) -> IndexedImage {
        IndexedImage {
            width,
            height,
            indices: (0..width * height)
                .map(|i| ((i as usize * 31 + i as usize / 7) % colors) as u8)
                .collect(),
            palette: (0..colors)
                .map(|i| Rgba::new(i as u8, (i * 3) as u8, (255 - i) as u8, 0xFF))
                .collect(),
        }
    }

    #[traced_test]
    #[test]
    fn encode_small_4bpp_layout() -> Result<()> {
        let image = IndexedImage {
            width: 4,
            height: 2,
            indices: vec![0, 1, 2, 3, 3, 2, 1, 0],
            palette: vec![
                Rgba::new(0x10, 0x20, 0x30, 0xFF),
                Rgba::new(0x11, 0x21, 0x31, 0x80),
                Rgba::new(0x12, 0x22, 0x32, 0x00),
                Rgba::new(0x13, 0x23, 0x33, 0xFF),
            ],
        };

        #[rustfmt::skip]
        let mut expected = vec![
            // File header
            0x54, 0x49, 0x4D, 0x33,
            0x04,
            0x06,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Picture header
            0x74, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            0x30, 0x00,
            0x04, 0x00,
            0x00,
            0x01,
            0x03,
            0x04,
            0x04, 0x00,
            0x02, 0x00,
            0x00, 0x00, 0x40, 0x49, 0x00, 0x00, 0x00, 0x00,
            0x60, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Image
            0x10, 0x32, 0x23, 0x01,
            // CLUT
            0x10, 0x20, 0x30, 0x80,
            0x11, 0x21, 0x31, 0x40,
            0x12, 0x22, 0x32, 0x00,
            0x13, 0x23, 0x33, 0x80,
        ];
        expected.extend_from_slice(&[0; 12 * 4]);

        let actual = encode(&image, Bpp::Four, &EncodeOptions::default())?;
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn round_trip_8bpp_200_colors() -> Result<()> {
        let image = gradient(128, 128, 200);

        let bytes = encode(&image, Bpp::Eight, &EncodeOptions::default())?;
        let picture = decode(&mut Cursor::new(bytes), 0)?;

        assert_eq!(picture.palette.len(), 200);
        assert_eq!(picture.pixel_indices.len(), 16384);
        assert_eq!(picture.pixel_indices, image.indices);
        assert_eq!(picture.palette, image.palette);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn round_trip_4bpp_swizzled() -> Result<()> {
        let image = gradient(128, 128, 16);

        let bytes = encode(&image, Bpp::Four, &EncodeOptions::default())?;
        assert_eq!(bytes.len(), 16 + 48 + 128 * 128 / 2 + 64);

        let picture = decode(&mut Cursor::new(bytes), 0)?;
        assert_eq!(picture.to_indexed()?, image);

        Ok(())
    }

    #[test]
    fn tim2_is_never_swizzled() -> Result<()> {
        let image = gradient(128, 128, 256);

        let options = EncodeOptions::builder().flavor(TimFlavor::Tim2).build();
        let bytes = encode(&image, Bpp::Eight, &options)?;
        assert_eq!(bytes[..4], *b"TIM2");
        assert_eq!(bytes[64..64 + 128 * 128], image.indices[..]);

        let tim = TimImage::decode(&mut Cursor::new(bytes), 0)?;
        assert_eq!(tim.flavor, TimFlavor::Tim2);
        assert_eq!(tim.pictures[0].pixel_indices, image.indices);

        Ok(())
    }

    #[test]
    fn tim3_swizzles_large_pictures() -> Result<()> {
        let image = gradient(128, 128, 256);

        let bytes = encode(&image, Bpp::Eight, &EncodeOptions::default())?;
        assert_ne!(bytes[64..64 + 128 * 128], image.indices[..]);

        Ok(())
    }

    #[test]
    fn padded_clut_colors() -> Result<()> {
        let image = gradient(16, 16, 40);

        let options = EncodeOptions::builder().pad_clut_colors(true).build();
        let bytes = encode(&image, Bpp::Eight, &options)?;
        let picture = decode(&mut Cursor::new(bytes), 0)?;

        assert_eq!(picture.clut_colors, 256);
        assert_eq!(picture.palette.len(), 256);
        assert_eq!(picture.palette[..40], image.palette[..]);

        Ok(())
    }

    #[test]
    fn decode_at_offset() -> Result<()> {
        let image = gradient(8, 8, 4);

        let mut bytes = vec![0xEE; 32];
        bytes.extend(encode(&image, Bpp::Four, &EncodeOptions::default())?);

        let picture = decode(&mut Cursor::new(bytes), 32)?;
        assert_eq!(picture.pixel_indices, image.indices);

        Ok(())
    }

    #[test]
    fn palette_too_large() {
        let image = gradient(16, 16, 17);
        assert!(matches!(
            encode(&image, Bpp::Four, &EncodeOptions::default()),
            Err(Error::PaletteTooLarge { colors: 17, max: 16 })
        ));
    }

    #[test]
    fn signature_mismatch() {
        let mut input = Cursor::new(b"TIM4\x04\x06\x01\x00\0\0\0\0\0\0\0\0".to_vec());
        assert!(matches!(
            decode(&mut input, 0),
            Err(Error::SignatureMismatch { found: 0x344D4954 })
        ));
    }
}
