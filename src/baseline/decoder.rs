//! Baseline decoder orchestration.

use log::debug;

use crate::baseline::bit_io::BitReader;
use crate::baseline::block::{pad_dimensions, place_block};
use crate::baseline::color::ycbcr_to_rgb;
use crate::baseline::dct::idct_8x8;
use crate::baseline::huffman::{HuffmanTable, extend_magnitude};
use crate::baseline::quantization::dequantize_block;
use crate::baseline::zigzag::from_zigzag;
use crate::constants::{
    AC_SYMBOL_EOB, AC_SYMBOL_ZRL, BLOCK_EDGE, BLOCK_LEN, MAX_AC_CATEGORY, MAX_DC_CATEGORY,
};
use crate::error::CodecError;
use crate::jpeg_marker_code::JpegMarkerCode;
use crate::jpeg_stream_reader::{
    FrameHeader, JfifHeader, Segment, SpiffHeader, parse_segments, read_app0_jfif,
    read_app8_spiff, read_dht, read_dqt, read_dri, read_sof0, read_sos_header,
};

/// A decoded image: RGBA pixels plus whatever application metadata the
/// stream carried.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Interleaved RGBA, alpha fixed at 255.
    pub pixels: Vec<u8>,
    pub jfif: Option<JfifHeader>,
    pub spiff: Option<SpiffHeader>,
}

#[derive(Default)]
struct DecoderState {
    frame: Option<FrameHeader>,
    quantization_tables: [Option<[u16; BLOCK_LEN]>; 4],
    dc_tables: [Option<HuffmanTable>; 4],
    ac_tables: [Option<HuffmanTable>; 4],
    restart_interval: u16,
    jfif: Option<JfifHeader>,
    spiff: Option<SpiffHeader>,
}

/// Baseline sequential decoder for the streams [`JpegEncoder`] emits and
/// any other SOF0 stream with three 8-bit components at 1x1 sampling.
///
/// [`JpegEncoder`]: crate::baseline::encoder::JpegEncoder
pub struct JpegDecoder<'a> {
    source: &'a [u8],
}

impl<'a> JpegDecoder<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self { source }
    }

    pub fn decode(&self) -> Result<DecodedImage, CodecError> {
        let segments = parse_segments(self.source)?;
        let mut state = DecoderState::default();
        let mut planes: Option<[Vec<f32>; 3]> = None;

        for segment in &segments {
            match segment {
                Segment::Standalone { .. } => {}
                Segment::Variable {
                    marker,
                    offset,
                    payload,
                } => self.read_segment(&mut state, *marker, *offset, payload)?,
                Segment::Scan {
                    offset,
                    header,
                    data,
                } => {
                    planes = Some(self.decode_scan(&mut state, *offset, header, data)?);
                }
            }
        }

        let frame = state.frame.ok_or(CodecError::FrameHeaderNotFound)?;
        let planes = planes.ok_or(CodecError::ScanNotFound)?;
        Ok(assemble_rgba(&frame, &planes, state.jfif, state.spiff))
    }

    fn read_segment(
        &self,
        state: &mut DecoderState,
        marker: JpegMarkerCode,
        offset: usize,
        payload: &[u8],
    ) -> Result<(), CodecError> {
        match marker {
            JpegMarkerCode::StartOfFrameBaseline => {
                state.frame = Some(read_sof0(payload, offset)?);
            }
            m if m.is_start_of_frame() => {
                return Err(CodecError::UnsupportedFrameType {
                    marker: marker as u8,
                });
            }
            JpegMarkerCode::DefineQuantizationTable => {
                for (id, table) in read_dqt(payload, offset)? {
                    state.quantization_tables[usize::from(id & 0x03)] = Some(table);
                }
            }
            JpegMarkerCode::DefineHuffmanTable => {
                for (class, id, table) in read_dht(payload, offset)? {
                    let slot = usize::from(id & 0x03);
                    if class == 0 {
                        state.dc_tables[slot] = Some(table);
                    } else {
                        state.ac_tables[slot] = Some(table);
                    }
                }
            }
            JpegMarkerCode::DefineRestartInterval => {
                state.restart_interval = read_dri(payload, offset)?;
            }
            JpegMarkerCode::ApplicationData0 => {
                if state.jfif.is_none() {
                    state.jfif = read_app0_jfif(payload, offset)?;
                }
            }
            JpegMarkerCode::ApplicationData8 => {
                if state.spiff.is_none() {
                    state.spiff = read_app8_spiff(payload, offset)?;
                }
            }
            // Remaining APPn and COM segments carry no decode state.
            m if m.is_skippable() => {}
            _ => {}
        }
        Ok(())
    }

    fn decode_scan(
        &self,
        state: &mut DecoderState,
        offset: usize,
        header: &[u8],
        data: &[u8],
    ) -> Result<[Vec<f32>; 3], CodecError> {
        let scan = read_sos_header(header, offset)?;
        let frame = state.frame.as_ref().ok_or(CodecError::FrameHeaderNotFound)?;
        if scan.components.len() != frame.components.len() {
            return Err(CodecError::UnsupportedComponentCount {
                count: scan.components.len() as u8,
            });
        }

        // Resolve each interleaved component's tables up front.
        let mut quant_tables = Vec::with_capacity(3);
        let mut dc_tables = Vec::with_capacity(3);
        let mut ac_tables = Vec::with_capacity(3);
        for frame_component in &frame.components {
            let scan_component = scan
                .components
                .iter()
                .find(|c| c.id == frame_component.id)
                .ok_or(CodecError::UndefinedTable {
                    kind: "scan component",
                    id: frame_component.id,
                })?;
            let q = usize::from(frame_component.quant_table_id & 0x03);
            quant_tables.push(state.quantization_tables[q].ok_or(
                CodecError::UndefinedTable {
                    kind: "quantization",
                    id: frame_component.quant_table_id,
                },
            )?);
            let d = usize::from(scan_component.dc_table_id & 0x03);
            dc_tables.push(state.dc_tables[d].clone().ok_or(CodecError::UndefinedTable {
                kind: "DC Huffman",
                id: scan_component.dc_table_id,
            })?);
            let a = usize::from(scan_component.ac_table_id & 0x03);
            ac_tables.push(state.ac_tables[a].clone().ok_or(CodecError::UndefinedTable {
                kind: "AC Huffman",
                id: scan_component.ac_table_id,
            })?);
        }

        let width = usize::from(frame.width);
        let height = usize::from(frame.height);
        let (padded_w, padded_h) = pad_dimensions(width, height);
        let blocks_w = padded_w / BLOCK_EDGE;
        let blocks_h = padded_h / BLOCK_EDGE;
        let total_mcus = blocks_w * blocks_h;
        debug!(
            "decoding scan: {}x{}, {} MCUs, restart interval {}",
            width, height, total_mcus, state.restart_interval
        );

        let mut planes = [
            vec![0.0f32; padded_w * padded_h],
            vec![0.0f32; padded_w * padded_h],
            vec![0.0f32; padded_w * padded_h],
        ];
        let mut reader = BitReader::new(data);
        let mut prev_dc = [0i32; 3];
        let restart_interval = usize::from(state.restart_interval);
        let mut mcus_decoded = 0usize;

        for block_y in 0..blocks_h {
            for block_x in 0..blocks_w {
                if restart_interval > 0
                    && mcus_decoded > 0
                    && mcus_decoded % restart_interval == 0
                    && mcus_decoded < total_mcus
                {
                    // The predictor resets with the marker; tolerate an
                    // absent marker the way the interchange format allows.
                    if reader.take_restart_marker().is_some() {
                        prev_dc = [0; 3];
                    }
                }

                for component in 0..3 {
                    let zigzag = decode_block(
                        &mut reader,
                        &dc_tables[component],
                        &ac_tables[component],
                        &mut prev_dc[component],
                    )?;
                    let quantized = from_zigzag(&zigzag);

                    let mut coefficients = [0.0f32; BLOCK_LEN];
                    dequantize_block(&quantized, &quant_tables[component], &mut coefficients);
                    let mut samples = [0.0f32; BLOCK_LEN];
                    idct_8x8(&coefficients, &mut samples);

                    place_block(
                        &mut planes[component],
                        padded_w,
                        block_x * BLOCK_EDGE,
                        block_y * BLOCK_EDGE,
                        &samples,
                    );
                }
                mcus_decoded += 1;
            }
        }

        Ok(planes)
    }
}

/// Entropy-decodes one block into zig-zag order, updating the component's
/// DC predictor.
fn decode_block(
    reader: &mut BitReader,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
    prev_dc: &mut i32,
) -> Result<[i16; BLOCK_LEN], CodecError> {
    let mut zigzag = [0i16; BLOCK_LEN];

    let dc_category = dc_table.decode(reader)?;
    if dc_category > MAX_DC_CATEGORY {
        return Err(CodecError::InvalidCoefficientCategory {
            category: dc_category,
        });
    }
    let bits = reader.read_bits(dc_category);
    *prev_dc += extend_magnitude(bits, dc_category);
    zigzag[0] = *prev_dc as i16;

    let mut k = 1usize;
    while k < BLOCK_LEN {
        let symbol = ac_table.decode(reader)?;
        if symbol == AC_SYMBOL_EOB {
            break;
        }
        if symbol == AC_SYMBOL_ZRL {
            k += 16;
            continue;
        }
        let run = usize::from(symbol >> 4);
        let ac_category = symbol & 0x0F;
        if ac_category > MAX_AC_CATEGORY {
            return Err(CodecError::InvalidCoefficientCategory {
                category: ac_category,
            });
        }
        k += run;
        if k >= BLOCK_LEN {
            return Err(CodecError::BlockCoefficientOverrun);
        }
        let bits = reader.read_bits(ac_category);
        zigzag[k] = extend_magnitude(bits, ac_category) as i16;
        k += 1;
    }

    Ok(zigzag)
}

/// Level-shifts the padded planes, converts to RGB, and crops to the
/// declared dimensions.
fn assemble_rgba(
    frame: &FrameHeader,
    planes: &[Vec<f32>; 3],
    jfif: Option<JfifHeader>,
    spiff: Option<SpiffHeader>,
) -> DecodedImage {
    let width = usize::from(frame.width);
    let height = usize::from(frame.height);
    let (padded_w, _) = pad_dimensions(width, height);

    let mut pixels = Vec::with_capacity(width * height * 4);
    for py in 0..height {
        for px in 0..width {
            let idx = py * padded_w + px;
            let y = planes[0][idx] + 128.0;
            let cb = planes[1][idx] + 128.0;
            let cr = planes[2][idx] + 128.0;
            let (r, g, b) = ycbcr_to_rgb(y, cb, cr);
            pixels.extend_from_slice(&[r, g, b, 255]);
        }
    }

    DecodedImage {
        width: frame.width.into(),
        height: frame.height.into(),
        pixels,
        jfif,
        spiff,
    }
}
