//! CLUT entry ordering and alpha scaling.
//!
//! 256 color CLUTs are stored with the second and third run of 8 entries in
//! every group of 32 swapped. The swap is its own inverse, so the same function
//! converts in both directions.

/// Entries per twiddle group
pub const GROUP: usize = 32;

const RUN: usize = 8;

/// Reorders each full group of 32 entries as `[0..8] [16..24] [8..16] [24..32]`.
///
/// Palettes with fewer than 32 entries are returned unchanged, as is any
/// trailing partial group.
pub fn twiddle<T: Clone>(palette: &[T]) -> Vec<T> {
    if palette.len() < GROUP {
        return palette.to_vec();
    }

    let mut out = Vec::with_capacity(palette.len());
    let mut groups = palette.chunks_exact(GROUP);
    for group in groups.by_ref() {
        out.extend_from_slice(&group[..RUN]);
        out.extend_from_slice(&group[RUN * 2..RUN * 3]);
        out.extend_from_slice(&group[RUN..RUN * 2]);
        out.extend_from_slice(&group[RUN * 3..]);
    }
    out.extend_from_slice(groups.remainder());
    out
}

/// Scales a 7-bit wire alpha (0..=0x80) to 8 bits, rounding to nearest
pub const fn expand_alpha(alpha: u8) -> u8 {
    let scaled = (alpha as u32 * 0xFF + 0x40) / 0x80;
    if scaled > 0xFF {
        0xFF
    } else {
        scaled as u8
    }
}

/// Scales an 8-bit alpha down to the 7-bit wire range, truncating
pub const fn compress_alpha(alpha: u8) -> u8 {
    (alpha as u32 * 0x80 / 0xFF) as u8
}
