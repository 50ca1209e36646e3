//! End-to-end conformance tests over the public API: stream framing,
//! marker grammar, scan-data stuffing, and codec/container round-trips.

use serde_json::json;
use stegojpeg_rs::jpeg_marker_code::JpegMarkerCode;
use stegojpeg_rs::jpeg_stream_reader::{Segment, parse_segments};
use stegojpeg_rs::{JpegDecoder, JpegEncoder, RgbaImage, container};

fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }
    RgbaImage {
        width,
        height,
        pixels,
    }
}

fn noise_image(width: u32, height: u32) -> RgbaImage {
    let mut state = 0x1234_5678u32;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        let [r, g, b, _] = state.to_be_bytes();
        pixels.extend_from_slice(&[r, g, b, 255]);
    }
    RgbaImage {
        width,
        height,
        pixels,
    }
}

fn mean_absolute_error(a: &[u8], b: &[u8]) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;
    for (src, dec) in a.chunks_exact(4).zip(b.chunks_exact(4)) {
        for c in 0..3 {
            sum += u64::from(src[c].abs_diff(dec[c]));
            count += 1;
        }
    }
    sum as f64 / count as f64
}

#[test]
fn solid_white_stream_structure_and_roundtrip() {
    let image = solid_image(16, 16, [255, 255, 255]);
    let encoded = JpegEncoder::new().encode(&image).unwrap();

    assert_eq!(&encoded[..2], &[0xFF, 0xD8]);
    assert_eq!(&encoded[encoded.len() - 2..], &[0xFF, 0xD9]);

    // Exactly one SOF0 declaring the source dimensions.
    let segments = parse_segments(&encoded).unwrap();
    let sof0: Vec<_> = segments
        .iter()
        .filter_map(|s| match s {
            Segment::Variable {
                marker: JpegMarkerCode::StartOfFrameBaseline,
                payload,
                ..
            } => Some(*payload),
            _ => None,
        })
        .collect();
    assert_eq!(sof0.len(), 1);
    let height = u16::from_be_bytes([sof0[0][1], sof0[0][2]]);
    let width = u16::from_be_bytes([sof0[0][3], sof0[0][4]]);
    assert_eq!((width, height), (16, 16));

    let decoded = JpegDecoder::new(&encoded).decode().unwrap();
    for px in decoded.pixels.chunks_exact(4) {
        for c in 0..3 {
            assert!(px[c] >= 253, "white decoded as {}", px[c]);
        }
        assert_eq!(px[3], 255);
    }
}

#[test]
fn small_gradient_size_and_error_bounds() {
    let mut pixels = Vec::new();
    for y in 0u32..8 {
        for x in 0u32..8 {
            pixels.extend_from_slice(&[((x * 32) % 256) as u8, ((y * 32) % 256) as u8, 128, 255]);
        }
    }
    let image = RgbaImage {
        width: 8,
        height: 8,
        pixels,
    };

    let encoded = JpegEncoder::new().encode(&image).unwrap();
    assert!(encoded.len() < 1024, "encoded {} bytes", encoded.len());

    let decoded = JpegDecoder::new(&encoded).decode().unwrap();
    let mae = mean_absolute_error(&image.pixels, &decoded.pixels);
    assert!(mae < 10.0, "mean absolute error {}", mae);
}

#[test]
fn scan_data_never_aliases_a_marker() {
    // Noise maximizes coded bits, exercising the stuffing path hard.
    let image = noise_image(48, 48);
    let mut encoder = JpegEncoder::new();
    encoder.set_restart_interval(5);
    let encoded = encoder.encode(&image).unwrap();

    let segments = parse_segments(&encoded).unwrap();
    let scan_data = segments
        .iter()
        .find_map(|s| match s {
            Segment::Scan { data, .. } => Some(*data),
            _ => None,
        })
        .expect("stream contains a scan");

    let mut i = 0;
    while i + 1 < scan_data.len() {
        if scan_data[i] == 0xFF {
            let next = scan_data[i + 1];
            assert!(
                next == 0x00 || (0xD0..=0xD7).contains(&next) || next == 0xFF,
                "unstuffed 0xFF {:02x} at scan offset {}",
                next,
                i
            );
            i += 2;
        } else {
            i += 1;
        }
    }
}

#[test]
fn noise_roundtrip_is_deterministic() {
    let image = noise_image(24, 16);
    let encoder = JpegEncoder::new();
    let first = encoder.encode(&image).unwrap();
    let second = encoder.encode(&image).unwrap();
    assert_eq!(first, second);

    let decoded_a = JpegDecoder::new(&first).decode().unwrap();
    let decoded_b = JpegDecoder::new(&first).decode().unwrap();
    assert_eq!(decoded_a.pixels, decoded_b.pixels);
}

#[test]
fn pad_dimensions_matches_block_grid() {
    use stegojpeg_rs::baseline::block::pad_dimensions;
    assert_eq!(pad_dimensions(1, 1), (8, 8));
    assert_eq!(pad_dimensions(9, 9), (16, 16));
    assert_eq!(pad_dimensions(8, 8), (8, 8));
}

#[test]
fn containerized_encode_unwraps_to_a_decodable_stream() {
    let image = solid_image(16, 8, [12, 240, 77]);
    let framed = JpegEncoder::new().encode_to_container(&image).unwrap();
    assert!(container::is_container(&framed));

    let unwrapped = container::decode(&framed).unwrap();
    assert_eq!(unwrapped.version, 1);
    assert_eq!(unwrapped.metadata["content"], json!("image/jpeg"));
    assert_eq!(unwrapped.metadata["width"], json!(16));

    let decoded = JpegDecoder::new(&unwrapped.payload).decode().unwrap();
    assert_eq!(decoded.width, 16);
    assert_eq!(decoded.height, 8);
}

#[test]
fn container_roundtrip_is_byte_exact_on_payload() {
    let payload: Vec<u8> = (0u16..=255).map(|v| v as u8).cycle().take(4096).collect();
    let metadata = json!({
        "name": "probe",
        "chunks": [1, 2, 3],
        "nested": {"deep": true}
    });
    let framed = container::encode(&payload, &metadata, 0x06).unwrap();
    let unwrapped = container::decode(&framed).unwrap();
    assert_eq!(unwrapped.payload, payload);
    assert_eq!(unwrapped.metadata, metadata);
    assert_eq!(unwrapped.flags, 0x06);
}

#[test]
fn failed_decode_produces_no_output() {
    let image = noise_image(16, 16);
    let mut encoded = JpegEncoder::new().encode(&image).unwrap();
    // Corrupt the DHT counts so entropy decode cannot proceed.
    let segments = parse_segments(&encoded).unwrap();
    let dht_offset = segments
        .iter()
        .find_map(|s| match s {
            Segment::Variable {
                marker: JpegMarkerCode::DefineHuffmanTable,
                offset,
                ..
            } => Some(*offset),
            _ => None,
        })
        .expect("stream contains a DHT");
    // Zero every count byte: all codes vanish.
    for byte in &mut encoded[dht_offset + 5..dht_offset + 21] {
        *byte = 0;
    }
    assert!(JpegDecoder::new(&encoded).decode().is_err());
}
