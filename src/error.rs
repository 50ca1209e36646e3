use thiserror::Error;

/// Errors surfaced by the codec and container entry points.
///
/// Variants are grouped by domain: malformed input, unsupported stream
/// features, container failures, and caller mistakes. Inner routines never
/// recover; errors propagate to the top-level encode/decode boundary.
#[derive(Error, Debug)]
pub enum CodecError {
    // Malformed JPEG input
    #[error("Start of image marker not found")]
    StartOfImageMarkerNotFound,
    #[error("Unexpected end of stream at byte offset {offset}")]
    UnexpectedEndOfStream { offset: usize },
    #[error("Expected marker start byte 0xFF at offset {offset}, found {found:#04x}")]
    MarkerStartByteNotFound { offset: usize, found: u8 },
    #[error("Unknown JPEG marker {marker:#04x} at offset {offset}")]
    UnknownJpegMarker { marker: u8, offset: usize },
    #[error("Invalid segment length {length} at offset {offset}")]
    InvalidSegmentLength { length: u16, offset: usize },
    #[error("Segment at offset {offset} is truncated: declares {declared} payload bytes, {available} remain")]
    TruncatedSegment {
        offset: usize,
        declared: usize,
        available: usize,
    },
    #[error("Invalid Huffman code in scan data")]
    InvalidHuffmanCode,
    #[error("Huffman table at offset {offset} overfills the code space")]
    InvalidHuffmanTableDefinition { offset: usize },
    #[error("Coefficient category {category} out of range")]
    InvalidCoefficientCategory { category: u8 },
    #[error("Run/size symbol overruns the 64-coefficient block")]
    BlockCoefficientOverrun,
    #[error("Frame header missing before start of scan")]
    FrameHeaderNotFound,
    #[error("Scan references undefined {kind} table {id}")]
    UndefinedTable { kind: &'static str, id: u8 },
    #[error("No scan data found before end of image")]
    ScanNotFound,

    // Unsupported stream features
    #[error("Unsupported frame type marker {marker:#04x}: only baseline SOF0 is supported")]
    UnsupportedFrameType { marker: u8 },
    #[error("Unsupported sample precision {precision}: only 8-bit samples are supported")]
    UnsupportedPrecision { precision: u8 },
    #[error("Unsupported sampling factors {factors:#04x}: only 1x1 (4:4:4) is supported")]
    UnsupportedSamplingFactors { factors: u8 },
    #[error("Unsupported component count {count}: expected 3")]
    UnsupportedComponentCount { count: u8 },
    #[error("Unsupported quantization table precision {precision}: only 8-bit entries are supported")]
    UnsupportedTablePrecision { precision: u8 },

    // Container failures
    #[error("Container magic mismatch: expected \"JSTG\", found {found:02x?}")]
    ContainerMagicMismatch { found: [u8; 4] },
    #[error("Unsupported container version {found}: expected {expected}")]
    ContainerVersionMismatch { expected: u8, found: u8 },
    #[error("Container truncated at offset {offset}: field needs {needed} bytes, {available} remain")]
    ContainerTruncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Container metadata is not valid JSON: {0}")]
    ContainerMetadataInvalid(#[from] serde_json::Error),
    #[error("CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch { expected: u32, computed: u32 },

    // Caller mistakes
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Pixel buffer too small: {width}x{height} RGBA needs {needed} bytes, got {got}")]
    SourceBufferTooSmall {
        width: u32,
        height: u32,
        needed: usize,
        got: usize,
    },
    #[error("Serialized metadata is {size} bytes; the 16-bit length field caps it at {max}")]
    MetadataTooLarge { size: usize, max: usize },
    #[error("Quality {0} out of range 1-100")]
    QualityOutOfRange(u8),
}
