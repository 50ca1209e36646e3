//! 8x8 tile partitioning with clamp-to-edge padding.

use crate::constants::{BLOCK_EDGE, BLOCK_LEN};

/// Rounds dimensions up to the next multiple of the block edge.
pub fn pad_dimensions(width: usize, height: usize) -> (usize, usize) {
    (
        width.div_ceil(BLOCK_EDGE) * BLOCK_EDGE,
        height.div_ceil(BLOCK_EDGE) * BLOCK_EDGE,
    )
}

/// Extracts the 8x8 tile whose top-left corner sits at (x0, y0) in `plane`.
///
/// Addresses past the right or bottom edge are clamped to the nearest
/// in-bounds row/column, so the padded region is never materialised.
pub fn extract_block(
    plane: &[f32],
    width: usize,
    height: usize,
    x0: usize,
    y0: usize,
) -> [f32; BLOCK_LEN] {
    let mut block = [0.0f32; BLOCK_LEN];
    for row in 0..BLOCK_EDGE {
        let sy = (y0 + row).min(height - 1);
        for col in 0..BLOCK_EDGE {
            let sx = (x0 + col).min(width - 1);
            block[row * BLOCK_EDGE + col] = plane[sy * width + sx];
        }
    }
    block
}

/// Writes an 8x8 tile into a padded plane of `padded_width` columns.
pub fn place_block(
    plane: &mut [f32],
    padded_width: usize,
    x0: usize,
    y0: usize,
    block: &[f32; BLOCK_LEN],
) {
    for row in 0..BLOCK_EDGE {
        let dst = (y0 + row) * padded_width + x0;
        plane[dst..dst + BLOCK_EDGE].copy_from_slice(&block[row * BLOCK_EDGE..][..BLOCK_EDGE]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_dimensions_rounds_up_to_block_multiples() {
        assert_eq!(pad_dimensions(1, 1), (8, 8));
        assert_eq!(pad_dimensions(9, 9), (16, 16));
        assert_eq!(pad_dimensions(8, 8), (8, 8));
        assert_eq!(pad_dimensions(17, 32), (24, 32));
    }

    #[test]
    fn extraction_replicates_edges() {
        // 2x2 source; everything past it must clamp to the nearest edge.
        let plane = [1.0, 2.0, 3.0, 4.0];
        let block = extract_block(&plane, 2, 2, 0, 0);
        assert_eq!(block[0], 1.0);
        assert_eq!(block[1], 2.0);
        // Column 2+ clamps to column 1, row 2+ clamps to row 1.
        assert_eq!(block[2], 2.0);
        assert_eq!(block[2 * 8 + 2], 4.0);
        assert_eq!(block[7 * 8 + 7], 4.0);
        assert_eq!(block[7 * 8], 3.0);
    }

    #[test]
    fn interior_blocks_copy_verbatim() {
        let width = 16;
        let height = 8;
        let plane: Vec<f32> = (0..width * height).map(|i| i as f32).collect();
        let block = extract_block(&plane, width, height, 8, 0);
        assert_eq!(block[0], 8.0);
        assert_eq!(block[8], 24.0);
        assert_eq!(block[63], 7.0 * 16.0 + 15.0);
    }

    #[test]
    fn place_block_roundtrips_extract() {
        let width = 8;
        let plane: Vec<f32> = (0..64).map(|i| i as f32 * 0.5).collect();
        let block = extract_block(&plane, width, 8, 0, 0);
        let mut out = vec![0.0f32; 64];
        place_block(&mut out, width, 0, 0, &block);
        assert_eq!(out, plane);
    }
}
