//! TEX0 register fields stored in picture headers.

use chi_gs::Bpp;

/// PSM value for 8-bit indexed textures
pub const PSMT8: u8 = 0x13;

/// PSM value for 4-bit indexed textures
pub const PSMT4: u8 = 0x14;

/// Decoded `GS_TEX0` register.
///
/// Bit layout from the most significant end:
/// `CLD:3 CSA:5 CSM:1 CPSM:4 CBP:14 TFX:2 TCC:1 TH:4 TW:4 PSM:6 TBW:6 TBP0:14`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GsTex0 {
    pub tbp0: u16,
    pub tbw: u8,
    pub psm: u8,
    pub tw: u8,
    pub th: u8,
    pub tcc: u8,
    pub tfx: u8,
    pub cbp: u16,
    pub cpsm: u8,
    pub csm: u8,
    pub csa: u8,
    pub cld: u8,
}

const fn field(raw: u64, shift: u32, bits: u32) -> u64 {
    (raw >> shift) & ((1 << bits) - 1)
}

impl GsTex0 {
    /// Register values the encoder writes for an indexed texture
    pub fn for_indexed(bpp: Bpp, width: u32, height: u32) -> Self {
        Self {
            tbw: (width / 64) as u8,
            psm: match bpp {
                Bpp::Four => PSMT4,
                Bpp::Eight => PSMT8,
            },
            tw: width.checked_ilog2().unwrap_or(0) as u8,
            th: height.checked_ilog2().unwrap_or(0) as u8,
            ..Default::default()
        }
    }
}

impl From<u64> for GsTex0 {
    fn from(raw: u64) -> Self {
        Self {
            tbp0: field(raw, 0, 14) as u16,
            tbw: field(raw, 14, 6) as u8,
            psm: field(raw, 20, 6) as u8,
            tw: field(raw, 26, 4) as u8,
            th: field(raw, 30, 4) as u8,
            tcc: field(raw, 34, 1) as u8,
            tfx: field(raw, 35, 2) as u8,
            cbp: field(raw, 37, 14) as u16,
            cpsm: field(raw, 51, 4) as u8,
            csm: field(raw, 55, 1) as u8,
            csa: field(raw, 56, 5) as u8,
            cld: field(raw, 61, 3) as u8,
        }
    }
}

impl From<GsTex0> for u64 {
    fn from(tex0: GsTex0) -> Self {
        (tex0.tbp0 as u64 & 0x3FFF)
            | (tex0.tbw as u64 & 0x3F) << 14
            | (tex0.psm as u64 & 0x3F) << 20
            | (tex0.tw as u64 & 0xF) << 26
            | (tex0.th as u64 & 0xF) << 30
            | (tex0.tcc as u64 & 0x1) << 34
            | (tex0.tfx as u64 & 0x3) << 35
            | (tex0.cbp as u64 & 0x3FFF) << 37
            | (tex0.cpsm as u64 & 0xF) << 51
            | (tex0.csm as u64 & 0x1) << 55
            | (tex0.csa as u64 & 0x1F) << 56
            | (tex0.cld as u64 & 0x7) << 61
    }
}
