//! Base types for structure of TIM2 and TIM3 files.

use binrw::{BinRead, BinWrite};

/// Size in bytes of [`FileHeader`]
pub const FILE_HEADER_SIZE: u64 = 16;

/// Size in bytes of [`PictureHeader`] without mipmap or user data
pub const PICTURE_HEADER_SIZE: u16 = 48;

/// TIM2/TIM3 file header
///
/// Both flavors share this layout and only differ in the signature.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct FileHeader {
    /// `"TIM2"` or `"TIM3"` read as a little endian integer
    pub signature: u32,

    /// Always 4 in files written by the encoder
    pub format_version: u8,

    /// Alignment identifier; 0 for TIM2, 6 for TIM3
    pub format_id: u8,

    /// Number of pictures following the header
    pub picture_count: u16,

    pub reserved: [u8; 8],
}

/// Pixel format of a picture's image data
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(repr = u8)]
pub enum ImageType {
    /// 16-bit direct color
    Direct16 = 0x01,

    /// 24-bit direct color
    Direct24 = 0x02,

    /// 32-bit direct color
    Direct32 = 0x03,

    /// 4-bit CLUT indices
    Indexed4 = 0x04,

    /// 8-bit CLUT indices
    Indexed8 = 0x05,
}

impl ImageType {
    /// Whether the image data holds CLUT indices
    pub const fn is_indexed(self) -> bool {
        matches!(self, ImageType::Indexed4 | ImageType::Indexed8)
    }

    pub const fn bpp(self) -> Option<chi_gs::Bpp> {
        match self {
            ImageType::Indexed4 => Some(chi_gs::Bpp::Four),
            ImageType::Indexed8 => Some(chi_gs::Bpp::Eight),
            _ => None,
        }
    }
}

impl From<chi_gs::Bpp> for ImageType {
    fn from(value: chi_gs::Bpp) -> Self {
        match value {
            chi_gs::Bpp::Four => ImageType::Indexed4,
            chi_gs::Bpp::Eight => ImageType::Indexed8,
        }
    }
}

/// Header preceding every picture in the file
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct PictureHeader {
    /// Header, image and CLUT size combined
    pub total_size: u32,

    pub clut_size: u32,

    pub image_size: u32,

    pub header_size: u16,

    pub clut_colors: u16,

    pub picture_format: u8,

    pub mipmap_textures: u8,

    /// CLUT pixel format, 3 for 32-bit RGBA
    pub clut_type: u8,

    pub image_type: ImageType,

    pub width: u16,

    pub height: u16,

    /// Raw TEX0 register, see [`crate::gs::GsTex0`]
    pub gs_tex0: u64,

    pub gs_tex1: u64,

    pub gs_regs: u32,

    pub gs_tex_clut: u32,
}
