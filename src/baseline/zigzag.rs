//! Zig-zag coefficient ordering for 8x8 blocks.

use crate::constants::BLOCK_LEN;

/// Natural-order index of the i-th coefficient in zig-zag scan order.
pub const ZIGZAG_ORDER: [usize; BLOCK_LEN] = [
    0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Zig-zag position of the i-th coefficient in natural row-major order.
pub const INVERSE_ZIGZAG_ORDER: [usize; BLOCK_LEN] = invert(&ZIGZAG_ORDER);

const fn invert(order: &[usize; BLOCK_LEN]) -> [usize; BLOCK_LEN] {
    let mut inverse = [0usize; BLOCK_LEN];
    let mut i = 0;
    while i < BLOCK_LEN {
        inverse[order[i]] = i;
        i += 1;
    }
    inverse
}

/// Reorders a natural-order block into zig-zag scan order.
pub fn to_zigzag(block: &[i16; BLOCK_LEN]) -> [i16; BLOCK_LEN] {
    let mut out = [0i16; BLOCK_LEN];
    for (i, &natural) in ZIGZAG_ORDER.iter().enumerate() {
        out[i] = block[natural];
    }
    out
}

/// Reorders a zig-zag block back into natural row-major order.
pub fn from_zigzag(block: &[i16; BLOCK_LEN]) -> [i16; BLOCK_LEN] {
    let mut out = [0i16; BLOCK_LEN];
    for (natural, &diagonal) in INVERSE_ZIGZAG_ORDER.iter().enumerate() {
        out[natural] = block[diagonal];
    }
    out
}
