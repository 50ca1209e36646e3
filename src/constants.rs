// Size of one coded tile edge and one coefficient block.
pub const BLOCK_EDGE: usize = 8;
pub const BLOCK_LEN: usize = BLOCK_EDGE * BLOCK_EDGE;

// Baseline SOF0 constraints this codec accepts and emits.
pub const SAMPLE_PRECISION: u8 = 8;
pub const COMPONENT_COUNT: u8 = 3;
pub const SAMPLING_FACTORS_1X1: u8 = 0x11;

// Category limits for the sign-magnitude coefficient encoding.
pub const MAX_DC_CATEGORY: u8 = 11;
pub const MAX_AC_CATEGORY: u8 = 10;

// AC symbols with no trailing value bits.
pub const AC_SYMBOL_EOB: u8 = 0x00;
pub const AC_SYMBOL_ZRL: u8 = 0xF0;

// The size in bytes of the segment length field.
pub const SEGMENT_LENGTH_SIZE: usize = 2;

// The maximum size of the data bytes that fit in a segment.
pub const SEGMENT_MAX_DATA_SIZE: usize = u16::MAX as usize - SEGMENT_LENGTH_SIZE;

// Payload container framing.
pub const CONTAINER_MAGIC: [u8; 4] = *b"JSTG";
pub const CONTAINER_VERSION: u8 = 1;
pub const CONTAINER_MAX_METADATA_SIZE: usize = u16::MAX as usize;

// Container flag bits; the algorithms behind them are supplied by callers.
pub const CONTAINER_FLAG_ENCRYPTED: u8 = 0x01;
pub const CONTAINER_FLAG_COMPRESSED: u8 = 0x02;
pub const CONTAINER_FLAG_CHUNKED: u8 = 0x04;
