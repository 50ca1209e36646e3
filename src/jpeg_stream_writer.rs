//! JPEG codestream writer.
//!
//! Emits the marker segments of a baseline interchange stream: SOI, APP0
//! (JFIF), DQT, SOF0, DHT, optional DRI, SOS, and EOI. Every variable-length
//! segment is prefixed with a big-endian length that includes the length
//! field itself.

use crate::baseline::zigzag::ZIGZAG_ORDER;
use crate::constants::{
    BLOCK_LEN, COMPONENT_COUNT, SAMPLE_PRECISION, SAMPLING_FACTORS_1X1, SEGMENT_LENGTH_SIZE,
};
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};

/// Builds a JPEG byte stream marker by marker.
pub struct JpegStreamWriter {
    bytes: Vec<u8>,
}

impl JpegStreamWriter {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn write_byte(&mut self, value: u8) {
        self.bytes.push(value);
    }

    fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_marker(&mut self, marker: JpegMarkerCode) {
        self.write_byte(JPEG_MARKER_START_BYTE);
        self.write_byte(marker as u8);
    }

    pub fn write_start_of_image(&mut self) {
        self.write_marker(JpegMarkerCode::StartOfImage);
    }

    pub fn write_end_of_image(&mut self) {
        self.write_marker(JpegMarkerCode::EndOfImage);
    }

    /// APP0 "JFIF\0" v1.01, aspect-ratio units, 1x1 density, no thumbnail.
    pub fn write_app0_jfif(&mut self) {
        self.write_marker(JpegMarkerCode::ApplicationData0);
        self.write_u16(16);
        self.bytes.extend_from_slice(b"JFIF\0");
        self.write_byte(1); // version major
        self.write_byte(1); // version minor
        self.write_byte(0); // density units: none
        self.write_u16(1); // x density
        self.write_u16(1); // y density
        self.write_byte(0); // thumbnail width
        self.write_byte(0); // thumbnail height
    }

    /// DQT with one 8-bit table. The payload is serialized in zig-zag order;
    /// `table` is in natural order.
    pub fn write_dqt(&mut self, table_id: u8, table: &[u16; BLOCK_LEN]) {
        self.write_marker(JpegMarkerCode::DefineQuantizationTable);
        self.write_u16((SEGMENT_LENGTH_SIZE + 1 + BLOCK_LEN) as u16);
        self.write_byte(table_id & 0x0F); // precision 0 (8-bit) | id
        for &natural in ZIGZAG_ORDER.iter() {
            self.write_byte(table[natural] as u8);
        }
    }

    /// SOF0 for three 8-bit components at 1x1 sampling; Y uses quantization
    /// table 0, Cb and Cr table 1.
    pub fn write_sof0(&mut self, width: u16, height: u16) {
        self.write_marker(JpegMarkerCode::StartOfFrameBaseline);
        let length = SEGMENT_LENGTH_SIZE + 1 + 2 + 2 + 1 + usize::from(COMPONENT_COUNT) * 3;
        self.write_u16(length as u16);
        self.write_byte(SAMPLE_PRECISION);
        self.write_u16(height);
        self.write_u16(width);
        self.write_byte(COMPONENT_COUNT);
        for i in 0..COMPONENT_COUNT {
            self.write_byte(i + 1); // component id
            self.write_byte(SAMPLING_FACTORS_1X1);
            self.write_byte(if i == 0 { 0 } else { 1 }); // quantization table id
        }
    }

    /// DHT with one table: class 0 = DC, class 1 = AC.
    pub fn write_dht(&mut self, table_class: u8, table_id: u8, lengths: &[u8; 16], values: &[u8]) {
        self.write_marker(JpegMarkerCode::DefineHuffmanTable);
        let length = SEGMENT_LENGTH_SIZE + 1 + 16 + values.len();
        self.write_u16(length as u16);
        self.write_byte(((table_class & 1) << 4) | (table_id & 0x0F));
        self.bytes.extend_from_slice(lengths);
        self.bytes.extend_from_slice(values);
    }

    pub fn write_dri(&mut self, restart_interval: u16) {
        self.write_marker(JpegMarkerCode::DefineRestartInterval);
        self.write_u16(4);
        self.write_u16(restart_interval);
    }

    /// SOS for three components, each selecting DC/AC table pair 0, full
    /// spectral range, no successive approximation.
    pub fn write_sos(&mut self) {
        self.write_marker(JpegMarkerCode::StartOfScan);
        let length = SEGMENT_LENGTH_SIZE + 1 + usize::from(COMPONENT_COUNT) * 2 + 3;
        self.write_u16(length as u16);
        self.write_byte(COMPONENT_COUNT);
        for i in 0..COMPONENT_COUNT {
            self.write_byte(i + 1); // component selector
            self.write_byte(0x00); // DC table 0 | AC table 0
        }
        self.write_byte(0); // Ss
        self.write_byte(63); // Se
        self.write_byte(0); // Ah/Al
    }

    /// Appends already entropy-coded (and stuffed) scan bytes verbatim.
    pub fn write_scan_data(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }
}

impl Default for JpegStreamWriter {
    fn default() -> Self {
        Self::new()
    }
}
