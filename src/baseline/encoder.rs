//! Baseline encoder orchestration.

use log::debug;

use crate::RgbaImage;
use crate::baseline::bit_io::BitWriter;
use crate::baseline::block::{extract_block, pad_dimensions};
use crate::baseline::color::rgba_to_ycbcr_planes;
use crate::baseline::dct::fdct_8x8;
use crate::baseline::huffman::{HuffmanTable, category, magnitude_bits};
use crate::baseline::quantization::{
    STD_CHROMINANCE_QUANT_TABLE, STD_LUMINANCE_QUANT_TABLE, quantize_block,
};
use crate::baseline::zigzag::to_zigzag;
use crate::constants::{AC_SYMBOL_EOB, AC_SYMBOL_ZRL, BLOCK_EDGE, BLOCK_LEN};
use crate::container;
use crate::error::CodecError;
use crate::jpeg_stream_writer::JpegStreamWriter;

/// Baseline sequential encoder: three 8-bit YCbCr components at 1x1
/// sampling, standard quantization tables, standard luminance Huffman
/// tables for every component.
pub struct JpegEncoder {
    dc_table: HuffmanTable,
    ac_table: HuffmanTable,
    quantization_table_lum: [u16; BLOCK_LEN],
    quantization_table_chrom: [u16; BLOCK_LEN],
    restart_interval: u16,
}

impl JpegEncoder {
    pub fn new() -> Self {
        Self {
            dc_table: HuffmanTable::standard_luminance_dc(),
            ac_table: HuffmanTable::standard_luminance_ac(),
            quantization_table_lum: STD_LUMINANCE_QUANT_TABLE,
            quantization_table_chrom: STD_CHROMINANCE_QUANT_TABLE,
            restart_interval: 0,
        }
    }

    /// Validates the quality knob. The value is reserved for table scaling
    /// in a later revision; v1 always encodes with the standard tables.
    pub fn with_quality(quality: u8) -> Result<Self, CodecError> {
        if !(1..=100).contains(&quality) {
            return Err(CodecError::QualityOutOfRange(quality));
        }
        Ok(Self::new())
    }

    /// Emits RSTn every `interval` MCUs; 0 disables restart markers.
    pub fn set_restart_interval(&mut self, interval: u16) {
        self.restart_interval = interval;
    }

    /// Encodes an RGBA image into a complete JFIF byte stream.
    pub fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
        image.validate()?;
        let width = image.width as usize;
        let height = image.height as usize;
        let (padded_w, padded_h) = pad_dimensions(width, height);
        let blocks_w = padded_w / BLOCK_EDGE;
        let blocks_h = padded_h / BLOCK_EDGE;
        let total_mcus = blocks_w * blocks_h;
        debug!(
            "encoding {}x{} image: {} MCUs, restart interval {}",
            width, height, total_mcus, self.restart_interval
        );

        let mut writer = JpegStreamWriter::new();
        writer.write_start_of_image();
        writer.write_app0_jfif();
        writer.write_dqt(0, &self.quantization_table_lum);
        writer.write_dqt(1, &self.quantization_table_chrom);
        writer.write_sof0(image.width as u16, image.height as u16);
        writer.write_dht(0, 0, self.dc_table.lengths(), self.dc_table.values());
        writer.write_dht(1, 0, self.ac_table.lengths(), self.ac_table.values());
        if self.restart_interval > 0 {
            writer.write_dri(self.restart_interval);
        }
        writer.write_sos();

        let planes = rgba_to_ycbcr_planes(&image.pixels, width, height);
        let tables = [
            &self.quantization_table_lum,
            &self.quantization_table_chrom,
            &self.quantization_table_chrom,
        ];

        let mut bit_writer = BitWriter::new();
        let mut prev_dc = [0i16; 3];
        let mut mcus_encoded = 0usize;
        let mut next_restart_index = 0u8;

        for block_y in 0..blocks_h {
            for block_x in 0..blocks_w {
                if self.restart_interval > 0
                    && mcus_encoded > 0
                    && mcus_encoded % usize::from(self.restart_interval) == 0
                    && mcus_encoded < total_mcus
                {
                    bit_writer.write_restart_marker(next_restart_index);
                    next_restart_index = (next_restart_index + 1) % 8;
                    prev_dc = [0; 3];
                }

                for (component, (plane, table)) in planes.iter().zip(tables).enumerate() {
                    let samples = extract_block(
                        plane,
                        width,
                        height,
                        block_x * BLOCK_EDGE,
                        block_y * BLOCK_EDGE,
                    );
                    prev_dc[component] = self.encode_block(
                        &mut bit_writer,
                        &samples,
                        table,
                        prev_dc[component],
                    );
                }
                mcus_encoded += 1;
            }
        }

        let scan = bit_writer.flush();
        debug!("scan data: {} bytes for {} MCUs", scan.len(), mcus_encoded);
        writer.write_scan_data(&scan);
        writer.write_end_of_image();
        Ok(writer.into_bytes())
    }

    /// Encodes the image and wraps the stream in a payload container with
    /// dimension metadata, ready for downstream embedding.
    pub fn encode_to_container(&self, image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
        let encoded = self.encode(image)?;
        let metadata = serde_json::json!({
            "content": "image/jpeg",
            "width": image.width,
            "height": image.height,
        });
        container::encode(&encoded, &metadata, 0)
    }

    /// DCT, quantize, zig-zag, and entropy-code one tile, returning its
    /// quantized DC value as the next predictor for the component.
    fn encode_block(
        &self,
        bit_writer: &mut BitWriter,
        samples: &[f32; BLOCK_LEN],
        quant_table: &[u16; BLOCK_LEN],
        prev_dc: i16,
    ) -> i16 {
        let mut coefficients = [0.0f32; BLOCK_LEN];
        fdct_8x8(samples, &mut coefficients);

        let mut quantized = [0i16; BLOCK_LEN];
        quantize_block(&coefficients, quant_table, &mut quantized);
        let zigzag = to_zigzag(&quantized);

        // Differential DC.
        let diff = i32::from(zigzag[0]) - i32::from(prev_dc);
        let dc_category = category(diff);
        let dc_code = self.dc_table.code(dc_category);
        bit_writer.write_bits(dc_code.value, dc_code.length);
        bit_writer.write_bits(magnitude_bits(diff, dc_category), dc_category);

        // Run/size AC with ZRL and EOB.
        let mut run = 0u8;
        for &ac in &zigzag[1..] {
            if ac == 0 {
                run += 1;
                continue;
            }
            while run > 15 {
                let zrl = self.ac_table.code(AC_SYMBOL_ZRL);
                bit_writer.write_bits(zrl.value, zrl.length);
                run -= 16;
            }
            let ac = i32::from(ac);
            let ac_category = category(ac);
            let symbol = (run << 4) | ac_category;
            let code = self.ac_table.code(symbol);
            bit_writer.write_bits(code.value, code.length);
            bit_writer.write_bits(magnitude_bits(ac, ac_category), ac_category);
            run = 0;
        }
        if run > 0 {
            let eob = self.ac_table.code(AC_SYMBOL_EOB);
            bit_writer.write_bits(eob.value, eob.length);
        }

        zigzag[0]
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::decoder::JpegDecoder;

    fn gradient_image(width: u32, height: u32) -> RgbaImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    ((x * 32) % 256) as u8,
                    ((y * 32) % 256) as u8,
                    128,
                    255,
                ]);
            }
        }
        RgbaImage {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn stream_is_framed_by_soi_and_eoi() {
        let image = gradient_image(16, 16);
        let encoded = JpegEncoder::new().encode(&image).unwrap();
        assert_eq!(&encoded[..2], &[0xFF, 0xD8]);
        assert_eq!(&encoded[encoded.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn small_gradient_stays_under_a_kilobyte() {
        let image = gradient_image(8, 8);
        let encoded = JpegEncoder::new().encode(&image).unwrap();
        assert!(encoded.len() < 1024, "encoded {} bytes", encoded.len());
    }

    #[test]
    fn roundtrip_color_gradient() {
        let image = gradient_image(16, 16);
        let encoded = JpegEncoder::new().encode(&image).unwrap();
        let decoded = JpegDecoder::new(&encoded).decode().unwrap();
        assert_eq!(decoded.width, 16);
        assert_eq!(decoded.height, 16);

        let mut error_sum = 0u64;
        let mut samples = 0u64;
        for (src, dec) in image.pixels.chunks_exact(4).zip(decoded.pixels.chunks_exact(4)) {
            for c in 0..3 {
                error_sum += u64::from(src[c].abs_diff(dec[c]));
                samples += 1;
            }
            assert_eq!(dec[3], 255);
        }
        let mean_error = error_sum as f64 / samples as f64;
        assert!(mean_error < 10.0, "mean absolute error {}", mean_error);
    }

    #[test]
    fn roundtrip_with_restart_markers() {
        let image = gradient_image(32, 16);
        let mut encoder = JpegEncoder::new();
        encoder.set_restart_interval(4);
        let encoded = encoder.encode(&image).unwrap();

        // 8 MCUs with interval 4 put one RST0 in the scan.
        let found_rst = encoded.windows(2).any(|w| w == [0xFF, 0xD0]);
        assert!(found_rst, "expected an RST0 marker in the stream");

        let decoded = JpegDecoder::new(&encoded).decode().unwrap();
        let mut error_sum = 0u64;
        let mut samples = 0u64;
        for (src, dec) in image.pixels.chunks_exact(4).zip(decoded.pixels.chunks_exact(4)) {
            for c in 0..3 {
                error_sum += u64::from(src[c].abs_diff(dec[c]));
                samples += 1;
            }
        }
        assert!((error_sum as f64 / samples as f64) < 10.0);
    }

    #[test]
    fn quality_is_validated() {
        assert!(matches!(
            JpegEncoder::with_quality(0),
            Err(CodecError::QualityOutOfRange(0))
        ));
        assert!(matches!(
            JpegEncoder::with_quality(101),
            Err(CodecError::QualityOutOfRange(101))
        ));
        assert!(JpegEncoder::with_quality(85).is_ok());
    }

    #[test]
    fn rejects_short_pixel_buffers() {
        let image = RgbaImage {
            width: 8,
            height: 8,
            pixels: vec![0u8; 8 * 8 * 3],
        };
        assert!(matches!(
            JpegEncoder::new().encode(&image),
            Err(CodecError::SourceBufferTooSmall { .. })
        ));
    }

    #[test]
    fn rejects_zero_dimensions() {
        let image = RgbaImage {
            width: 0,
            height: 8,
            pixels: Vec::new(),
        };
        assert!(matches!(
            JpegEncoder::new().encode(&image),
            Err(CodecError::InvalidDimensions { .. })
        ));
    }
}
