//! JPEG codestream parser.
//!
//! [`parse_segments`] scans a byte stream into a flat list of tagged
//! segments without interpreting their payloads: standalone markers,
//! variable-length segments, and the SOS header with its delimited scan
//! data. The typed `read_*` functions then interpret individual payloads for
//! the decode pipeline.

use crate::baseline::huffman::HuffmanTable;
use crate::baseline::zigzag::ZIGZAG_ORDER;
use crate::constants::BLOCK_LEN;
use crate::error::CodecError;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};

/// One parsed stream segment. Payload slices borrow from the source buffer.
#[derive(Debug, Clone)]
pub enum Segment<'a> {
    /// SOI, EOI, or RSTn: a bare marker with no payload.
    Standalone {
        marker: JpegMarkerCode,
        offset: usize,
    },
    /// A length-prefixed segment; `payload` excludes the length field.
    Variable {
        marker: JpegMarkerCode,
        offset: usize,
        payload: &'a [u8],
    },
    /// SOS header plus the entropy-coded bytes that follow it, verbatim.
    /// Stuffed 0xFF 0x00 pairs and RST0-RST7 markers stay inside `data`;
    /// any other marker terminates it and is parsed as the next segment.
    Scan {
        offset: usize,
        header: &'a [u8],
        data: &'a [u8],
    },
}

/// Scans `source` into segments, from SOI through EOI.
pub fn parse_segments(source: &[u8]) -> Result<Vec<Segment<'_>>, CodecError> {
    let mut segments = Vec::new();
    let mut position = 0usize;

    if read_marker_byte(source, &mut position)? != JpegMarkerCode::StartOfImage as u8 {
        return Err(CodecError::StartOfImageMarkerNotFound);
    }
    segments.push(Segment::Standalone {
        marker: JpegMarkerCode::StartOfImage,
        offset: 0,
    });

    loop {
        let offset = position;
        let marker_byte = read_marker_byte(source, &mut position)?;
        let marker = classify_marker(marker_byte, offset)?;

        if marker.is_standalone() {
            segments.push(Segment::Standalone { marker, offset });
            if marker == JpegMarkerCode::EndOfImage {
                return Ok(segments);
            }
            continue;
        }

        let payload = read_segment_payload(source, &mut position, offset)?;
        if marker == JpegMarkerCode::StartOfScan {
            let data_start = position;
            position = scan_data_end(source, data_start);
            segments.push(Segment::Scan {
                offset,
                header: payload,
                data: &source[data_start..position],
            });
        } else {
            segments.push(Segment::Variable {
                marker,
                offset,
                payload,
            });
        }
    }
}

/// Consumes 0xFF fill bytes and the marker start byte, returning the marker
/// identification byte.
fn read_marker_byte(source: &[u8], position: &mut usize) -> Result<u8, CodecError> {
    let offset = *position;
    match source.get(offset) {
        None => return Err(CodecError::UnexpectedEndOfStream { offset }),
        Some(&JPEG_MARKER_START_BYTE) => {}
        Some(&found) => return Err(CodecError::MarkerStartByteNotFound { offset, found }),
    }
    let mut at = offset + 1;
    // Any number of 0xFF fill bytes may precede the identification byte.
    while source.get(at) == Some(&JPEG_MARKER_START_BYTE) {
        at += 1;
    }
    match source.get(at) {
        None => Err(CodecError::UnexpectedEndOfStream { offset: at }),
        Some(0x00) => Err(CodecError::UnknownJpegMarker {
            marker: 0x00,
            offset: at,
        }),
        Some(&byte) => {
            *position = at + 1;
            Ok(byte)
        }
    }
}

fn classify_marker(byte: u8, offset: usize) -> Result<JpegMarkerCode, CodecError> {
    JpegMarkerCode::try_from(byte).map_err(|_| {
        // SOFn and DAC codes outside the enum are features, not garbage.
        if (0xC0..=0xCF).contains(&byte) {
            CodecError::UnsupportedFrameType { marker: byte }
        } else {
            CodecError::UnknownJpegMarker {
                marker: byte,
                offset,
            }
        }
    })
}

fn read_segment_payload<'a>(
    source: &'a [u8],
    position: &mut usize,
    offset: usize,
) -> Result<&'a [u8], CodecError> {
    let length_bytes = source
        .get(*position..*position + 2)
        .ok_or(CodecError::UnexpectedEndOfStream { offset: *position })?;
    let length = u16::from_be_bytes([length_bytes[0], length_bytes[1]]);
    if length < 2 {
        return Err(CodecError::InvalidSegmentLength { length, offset });
    }
    let declared = usize::from(length) - 2;
    let start = *position + 2;
    let available = source.len().saturating_sub(start);
    if declared > available {
        return Err(CodecError::TruncatedSegment {
            offset,
            declared,
            available,
        });
    }
    *position = start + declared;
    Ok(&source[start..start + declared])
}

/// Finds the first offset at or after `start` where scan data ends: a 0xFF
/// followed by a byte other than 0x00 (stuffing), 0xFF (fill), or a restart
/// marker. Runs to the end of the buffer if no such marker exists.
fn scan_data_end(source: &[u8], start: usize) -> usize {
    let mut at = start;
    while at + 1 < source.len() {
        if source[at] != JPEG_MARKER_START_BYTE {
            at += 1;
            continue;
        }
        match source[at + 1] {
            0x00 => at += 2,
            JPEG_MARKER_START_BYTE => at += 1,
            0xD0..=0xD7 => at += 2,
            _ => return at,
        }
    }
    source.len()
}

// Typed segment readers

/// One component declared in a SOF0 frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComponent {
    pub id: u8,
    pub h_samp_factor: u8,
    pub v_samp_factor: u8,
    pub quant_table_id: u8,
}

/// Parsed SOF0 frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub precision: u8,
    pub width: u16,
    pub height: u16,
    pub components: Vec<FrameComponent>,
}

/// One component reference in a SOS scan header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    pub id: u8,
    pub dc_table_id: u8,
    pub ac_table_id: u8,
}

/// Parsed SOS scan header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub approximation: u8,
}

/// APP0 JFIF metadata surfaced by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JfifHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub density_units: u8,
    pub x_density: u16,
    pub y_density: u16,
    pub thumbnail_width: u8,
    pub thumbnail_height: u8,
}

/// APP8 SPIFF metadata surfaced by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiffHeader {
    pub profile_id: u8,
    pub component_count: u8,
    pub height: u32,
    pub width: u32,
    pub color_space: u8,
    pub bits_per_sample: u8,
    pub compression_type: u8,
    pub resolution_units: u8,
    pub vertical_resolution: u32,
    pub horizontal_resolution: u32,
}

/// Bounds-checked cursor over one segment payload. Offsets in errors are
/// absolute stream offsets.
struct SegmentCursor<'a> {
    payload: &'a [u8],
    position: usize,
    base_offset: usize,
}

impl<'a> SegmentCursor<'a> {
    fn new(payload: &'a [u8], base_offset: usize) -> Self {
        Self {
            payload,
            position: 0,
            base_offset,
        }
    }

    fn remaining(&self) -> usize {
        self.payload.len() - self.position
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = self
            .payload
            .get(self.position)
            .copied()
            .ok_or(CodecError::UnexpectedEndOfStream {
                offset: self.base_offset + self.position,
            })?;
        self.position += 1;
        Ok(byte)
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        let hi = self.read_u8()?;
        let lo = self.read_u8()?;
        Ok(u16::from(hi) << 8 | u16::from(lo))
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let hi = self.read_u16()?;
        let lo = self.read_u16()?;
        Ok(u32::from(hi) << 16 | u32::from(lo))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let slice = self
            .payload
            .get(self.position..self.position + len)
            .ok_or(CodecError::UnexpectedEndOfStream {
                offset: self.base_offset + self.payload.len(),
            })?;
        self.position += len;
        Ok(slice)
    }
}

/// Interprets a SOF0 payload, enforcing the baseline constraints this codec
/// supports: 8-bit precision, three components, 1x1 sampling.
pub fn read_sof0(payload: &[u8], offset: usize) -> Result<FrameHeader, CodecError> {
    let mut cursor = SegmentCursor::new(payload, offset);
    let precision = cursor.read_u8()?;
    if precision != 8 {
        return Err(CodecError::UnsupportedPrecision { precision });
    }
    let height = cursor.read_u16()?;
    let width = cursor.read_u16()?;
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        });
    }
    let component_count = cursor.read_u8()?;
    if component_count != 3 {
        return Err(CodecError::UnsupportedComponentCount {
            count: component_count,
        });
    }

    let mut components = Vec::with_capacity(usize::from(component_count));
    for _ in 0..component_count {
        let id = cursor.read_u8()?;
        let sampling = cursor.read_u8()?;
        if sampling != 0x11 {
            return Err(CodecError::UnsupportedSamplingFactors { factors: sampling });
        }
        let quant_table_id = cursor.read_u8()?;
        components.push(FrameComponent {
            id,
            h_samp_factor: sampling >> 4,
            v_samp_factor: sampling & 0x0F,
            quant_table_id,
        });
    }
    Ok(FrameHeader {
        precision,
        width,
        height,
        components,
    })
}

/// Interprets a DQT payload, which may define several tables. Payload
/// entries arrive in zig-zag order and are stored in natural order.
pub fn read_dqt(payload: &[u8], offset: usize) -> Result<Vec<(u8, [u16; BLOCK_LEN])>, CodecError> {
    let mut cursor = SegmentCursor::new(payload, offset);
    let mut tables = Vec::new();
    while cursor.remaining() > 0 {
        let pq_tq = cursor.read_u8()?;
        let precision = pq_tq >> 4;
        if precision != 0 {
            return Err(CodecError::UnsupportedTablePrecision { precision });
        }
        let id = pq_tq & 0x0F;
        let entries = cursor.read_slice(BLOCK_LEN)?;
        let mut table = [0u16; BLOCK_LEN];
        for (i, &natural) in ZIGZAG_ORDER.iter().enumerate() {
            table[natural] = u16::from(entries[i]);
        }
        tables.push((id, table));
    }
    Ok(tables)
}

/// Interprets a DHT payload, which may define several tables.
/// Returns (class, id, table) triples; class 0 = DC, class 1 = AC.
pub fn read_dht(payload: &[u8], offset: usize) -> Result<Vec<(u8, u8, HuffmanTable)>, CodecError> {
    let mut cursor = SegmentCursor::new(payload, offset);
    let mut tables = Vec::new();
    while cursor.remaining() > 0 {
        let tc_th = cursor.read_u8()?;
        let class = tc_th >> 4;
        let id = tc_th & 0x0F;
        let mut lengths = [0u8; 16];
        lengths.copy_from_slice(cursor.read_slice(16)?);
        let value_count = lengths.iter().map(|&n| usize::from(n)).sum();
        if value_count > 256 {
            return Err(CodecError::InvalidSegmentLength {
                length: value_count as u16,
                offset,
            });
        }
        // Counts must not overfill the code space at any bit length, or the
        // canonical assignment stops being a prefix code.
        let mut code = 0u32;
        for (i, &count) in lengths.iter().enumerate() {
            code += u32::from(count);
            if code > 1u32 << (i + 1) {
                return Err(CodecError::InvalidHuffmanTableDefinition { offset });
            }
            code <<= 1;
        }
        let values = cursor.read_slice(value_count)?;
        tables.push((class, id, HuffmanTable::from_dht(&lengths, values)));
    }
    Ok(tables)
}

/// Interprets a SOS header payload.
pub fn read_sos_header(payload: &[u8], offset: usize) -> Result<ScanHeader, CodecError> {
    let mut cursor = SegmentCursor::new(payload, offset);
    let component_count = cursor.read_u8()?;
    let mut components = Vec::with_capacity(usize::from(component_count));
    for _ in 0..component_count {
        let id = cursor.read_u8()?;
        let selector = cursor.read_u8()?;
        components.push(ScanComponent {
            id,
            dc_table_id: selector >> 4,
            ac_table_id: selector & 0x0F,
        });
    }
    let spectral_start = cursor.read_u8()?;
    let spectral_end = cursor.read_u8()?;
    let approximation = cursor.read_u8()?;
    Ok(ScanHeader {
        components,
        spectral_start,
        spectral_end,
        approximation,
    })
}

/// Interprets a DRI payload.
pub fn read_dri(payload: &[u8], offset: usize) -> Result<u16, CodecError> {
    SegmentCursor::new(payload, offset).read_u16()
}

/// Interprets an APP0 payload as a JFIF header. Non-JFIF APP0 segments
/// yield `None` rather than an error.
pub fn read_app0_jfif(payload: &[u8], offset: usize) -> Result<Option<JfifHeader>, CodecError> {
    if payload.len() < 5 || &payload[..5] != b"JFIF\0" {
        return Ok(None);
    }
    let mut cursor = SegmentCursor::new(&payload[5..], offset + 5);
    Ok(Some(JfifHeader {
        version_major: cursor.read_u8()?,
        version_minor: cursor.read_u8()?,
        density_units: cursor.read_u8()?,
        x_density: cursor.read_u16()?,
        y_density: cursor.read_u16()?,
        thumbnail_width: cursor.read_u8()?,
        thumbnail_height: cursor.read_u8()?,
    }))
}

/// Interprets an APP8 payload as a SPIFF header. Non-SPIFF APP8 segments
/// yield `None` rather than an error.
pub fn read_app8_spiff(payload: &[u8], offset: usize) -> Result<Option<SpiffHeader>, CodecError> {
    if payload.len() < 6 || &payload[..6] != b"SPIFF\0" {
        return Ok(None);
    }
    let mut cursor = SegmentCursor::new(&payload[6..], offset + 6);
    let _version_major = cursor.read_u8()?;
    let _version_minor = cursor.read_u8()?;
    Ok(Some(SpiffHeader {
        profile_id: cursor.read_u8()?,
        component_count: cursor.read_u8()?,
        height: cursor.read_u32()?,
        width: cursor.read_u32()?,
        color_space: cursor.read_u8()?,
        bits_per_sample: cursor.read_u8()?,
        compression_type: cursor.read_u8()?,
        resolution_units: cursor.read_u8()?,
        vertical_resolution: cursor.read_u32()?,
        horizontal_resolution: cursor.read_u32()?,
    }))
}
