//! 8x8 type-II DCT and its inverse.

use std::f32::consts::PI;
use std::sync::OnceLock;

use crate::constants::{BLOCK_EDGE, BLOCK_LEN};

/// COS[x][u] = cos((2x + 1) * u * pi / 16), shared by both directions.
fn cosine_kernel() -> &'static [[f32; BLOCK_EDGE]; BLOCK_EDGE] {
    static KERNEL: OnceLock<[[f32; BLOCK_EDGE]; BLOCK_EDGE]> = OnceLock::new();
    KERNEL.get_or_init(|| {
        let mut table = [[0.0f32; BLOCK_EDGE]; BLOCK_EDGE];
        for (x, row) in table.iter_mut().enumerate() {
            for (u, entry) in row.iter_mut().enumerate() {
                *entry = (((2 * x + 1) * u) as f32 * PI / 16.0).cos();
            }
        }
        table
    })
}

fn normalizer(k: usize) -> f32 {
    if k == 0 {
        std::f32::consts::FRAC_1_SQRT_2
    } else {
        1.0
    }
}

/// Forward DCT: spatial samples (centred around zero) to frequency
/// coefficients, row-major (u, v) with DC at index 0.
pub fn fdct_8x8(input: &[f32; BLOCK_LEN], output: &mut [f32; BLOCK_LEN]) {
    let cos = cosine_kernel();
    for u in 0..BLOCK_EDGE {
        for v in 0..BLOCK_EDGE {
            let mut sum = 0.0f32;
            for x in 0..BLOCK_EDGE {
                for y in 0..BLOCK_EDGE {
                    sum += input[x * BLOCK_EDGE + y] * cos[x][u] * cos[y][v];
                }
            }
            output[u * BLOCK_EDGE + v] = 0.25 * normalizer(u) * normalizer(v) * sum;
        }
    }
}

/// Inverse DCT: frequency coefficients back to centred spatial samples.
pub fn idct_8x8(input: &[f32; BLOCK_LEN], output: &mut [f32; BLOCK_LEN]) {
    let cos = cosine_kernel();
    for x in 0..BLOCK_EDGE {
        for y in 0..BLOCK_EDGE {
            let mut sum = 0.0f32;
            for u in 0..BLOCK_EDGE {
                for v in 0..BLOCK_EDGE {
                    sum += normalizer(u)
                        * normalizer(v)
                        * input[u * BLOCK_EDGE + v]
                        * cos[x][u]
                        * cos[y][v];
                }
            }
            output[x * BLOCK_EDGE + y] = 0.25 * sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_block_concentrates_in_dc() {
        let input = [-128.0f32; BLOCK_LEN];
        let mut coeffs = [0.0f32; BLOCK_LEN];
        fdct_8x8(&input, &mut coeffs);

        // DC = 8 * sample for a flat block; every AC term vanishes.
        assert!((coeffs[0] - (-1024.0)).abs() < 0.01);
        for &ac in &coeffs[1..] {
            assert!(ac.abs() < 0.01, "nonzero AC coefficient {}", ac);
        }
    }

    #[test]
    fn roundtrip_within_one_unit() {
        // Deterministic pseudo-random samples across [-128, 127].
        let mut state = 0x2F6E2B1u32;
        let mut input = [0.0f32; BLOCK_LEN];
        for v in input.iter_mut() {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            *v = ((state >> 24) as i32 - 128) as f32;
        }

        let mut coeffs = [0.0f32; BLOCK_LEN];
        let mut restored = [0.0f32; BLOCK_LEN];
        fdct_8x8(&input, &mut coeffs);
        idct_8x8(&coeffs, &mut restored);

        for i in 0..BLOCK_LEN {
            assert!(
                (input[i] - restored[i]).abs() < 1.0,
                "sample {}: {} vs {}",
                i,
                input[i],
                restored[i]
            );
        }
    }

    #[test]
    fn single_basis_function_roundtrips() {
        let mut coeffs = [0.0f32; BLOCK_LEN];
        coeffs[1] = 100.0;
        let mut spatial = [0.0f32; BLOCK_LEN];
        idct_8x8(&coeffs, &mut spatial);
        let mut back = [0.0f32; BLOCK_LEN];
        fdct_8x8(&spatial, &mut back);
        for i in 0..BLOCK_LEN {
            let want = if i == 1 { 100.0 } else { 0.0 };
            assert!((back[i] - want).abs() < 0.01, "coefficient {}", i);
        }
    }
}
