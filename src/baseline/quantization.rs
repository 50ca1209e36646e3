//! Quantization tables and per-coefficient rounding division.

use crate::constants::BLOCK_LEN;

/// Standard luminance quantization table (Annex K, quality 50), natural order.
pub const STD_LUMINANCE_QUANT_TABLE: [u16; BLOCK_LEN] = [
    16, 11, 10, 16, 24, 40, 51, 61,
    12, 12, 14, 19, 26, 58, 60, 55,
    14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62,
    18, 22, 37, 56, 68, 109, 103, 77,
    24, 35, 55, 64, 81, 104, 113, 92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Standard chrominance quantization table (Annex K, quality 50), natural order.
pub const STD_CHROMINANCE_QUANT_TABLE: [u16; BLOCK_LEN] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Divides each coefficient by its table entry, rounding to nearest
/// (ties away from zero via `f32::round`).
pub fn quantize_block(
    coefficients: &[f32; BLOCK_LEN],
    table: &[u16; BLOCK_LEN],
    output: &mut [i16; BLOCK_LEN],
) {
    for i in 0..BLOCK_LEN {
        output[i] = (coefficients[i] / f32::from(table[i])).round() as i16;
    }
}

/// Multiplies each quantized coefficient back by its table entry.
pub fn dequantize_block(
    quantized: &[i16; BLOCK_LEN],
    table: &[u16; BLOCK_LEN],
    output: &mut [f32; BLOCK_LEN],
) {
    for i in 0..BLOCK_LEN {
        output[i] = f32::from(quantized[i]) * f32::from(table[i]);
    }
}
