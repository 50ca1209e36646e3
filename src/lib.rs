/*!
# stegojpeg-rs

`stegojpeg-rs` is a pure Rust baseline JPEG codec paired with a
self-describing payload container for steganographic workflows.

## Codec

The codec implements baseline sequential DCT (SOF0) with three 8-bit YCbCr
components at 1x1 sampling:

- **Encoder**: RGBA pixels, BT.601 colour conversion, 8x8 tiling with
  edge-replicated padding, forward DCT, quantisation, zig-zag reordering,
  and differential-DC / run-length-AC Huffman coding with byte stuffing.
- **Decoder**: marker grammar parsing, O(1) table-driven entropy decoding,
  dequantisation, inverse DCT, and colour reconstruction back to RGBA.

## Container

Arbitrary binary payloads can be framed with magic bytes, a version, flag
bits, JSON-typed metadata, and a CRC-32 trailer (module [`container`]), ready
for embedding in encoded output by a downstream carrier.

## Safety

Written entirely in safe Rust; every public operation returns a typed
[`CodecError`] instead of panicking on malformed input.
*/

pub mod constants;
pub mod error;
pub mod jpeg_marker_code;
pub mod jpeg_stream_reader;
pub mod jpeg_stream_writer;

pub mod baseline;
pub mod container;

pub use baseline::{DecodedImage, JpegDecoder, JpegEncoder};
pub use container::ContainerPayload;
pub use error::CodecError;

/// An owned RGBA input image. Samples are interleaved R, G, B, A rows in
/// raster order; alpha is carried but ignored by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    /// Width of the image in pixels.
    pub width: u32,
    /// Height of the image in pixels.
    pub height: u32,
    /// Interleaved 8-bit RGBA samples, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Maximum dimension a SOF0 16-bit size field can carry.
    pub const MAX_DIMENSION: u32 = u16::MAX as u32;

    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CodecError> {
        let image = Self {
            width,
            height,
            pixels,
        };
        image.validate()?;
        Ok(image)
    }

    /// Checks dimensions and buffer size; the encoder calls this on entry.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.width == 0
            || self.height == 0
            || self.width > Self::MAX_DIMENSION
            || self.height > Self::MAX_DIMENSION
        {
            return Err(CodecError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let needed = self.width as usize * self.height as usize * 4;
        if self.pixels.len() < needed {
            return Err(CodecError::SourceBufferTooSmall {
                width: self.width,
                height: self.height,
                needed,
                got: self.pixels.len(),
            });
        }
        Ok(())
    }
}
