// Baseline sequential DCT codec (SOF0).
pub mod bit_io;
pub mod block;
pub mod color;
pub mod dct;
pub mod decoder;
pub mod encoder;
pub mod huffman;
pub mod quantization;
pub mod zigzag;

pub use decoder::{DecodedImage, JpegDecoder};
pub use encoder::JpegEncoder;
