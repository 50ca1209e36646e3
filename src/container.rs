//! Self-describing payload container for steganographic embedding.
//!
//! Layout: magic "JSTG", version, flags, 16-bit metadata length, UTF-8 JSON
//! metadata, 32-bit payload length, payload, CRC-32 trailer over everything
//! before it. All multi-byte integers are big-endian. The flag bits only
//! describe how the payload was prepared; the transforms themselves
//! (encryption, compression, chunking) are supplied by the caller.

use serde::Serialize;
use serde_json::Value;

use crate::constants::{
    CONTAINER_MAGIC, CONTAINER_MAX_METADATA_SIZE, CONTAINER_VERSION,
};
use crate::error::CodecError;

/// A decoded container: the framed payload plus its envelope fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerPayload {
    pub payload: Vec<u8>,
    pub metadata: Value,
    pub flags: u8,
    pub version: u8,
}

/// Frames `payload` with metadata, flags, and a CRC-32 trailer. Metadata is
/// any serializable value; it travels as UTF-8 JSON.
pub fn encode<M: Serialize + ?Sized>(
    payload: &[u8],
    metadata: &M,
    flags: u8,
) -> Result<Vec<u8>, CodecError> {
    let metadata_bytes = serde_json::to_vec(metadata)?;
    if metadata_bytes.len() > CONTAINER_MAX_METADATA_SIZE {
        return Err(CodecError::MetadataTooLarge {
            size: metadata_bytes.len(),
            max: CONTAINER_MAX_METADATA_SIZE,
        });
    }

    let total = CONTAINER_MAGIC.len() + 1 + 1 + 2 + metadata_bytes.len() + 4 + payload.len() + 4;
    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(&CONTAINER_MAGIC);
    bytes.push(CONTAINER_VERSION);
    bytes.push(flags);
    bytes.extend_from_slice(&(metadata_bytes.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&metadata_bytes);
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload);

    let crc = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&crc.to_be_bytes());
    Ok(bytes)
}

/// Unframes a container, validating magic, version, field bounds, metadata
/// JSON, and the CRC-32 trailer.
pub fn decode(bytes: &[u8]) -> Result<ContainerPayload, CodecError> {
    let mut cursor = Cursor::new(bytes);

    let magic = cursor.take(4)?;
    if magic != CONTAINER_MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(magic);
        return Err(CodecError::ContainerMagicMismatch { found });
    }

    let version = cursor.take(1)?[0];
    if version != CONTAINER_VERSION {
        return Err(CodecError::ContainerVersionMismatch {
            expected: CONTAINER_VERSION,
            found: version,
        });
    }
    let flags = cursor.take(1)?[0];

    let metadata_len = usize::from(cursor.take_u16()?);
    let metadata_bytes = cursor.take(metadata_len)?;

    let payload_len = cursor.take_u32()? as usize;
    let payload = cursor.take(payload_len)?;

    // Everything before the trailer is covered by the CRC.
    let crc_offset = cursor.position;
    let expected = cursor.take_u32()?;
    let computed = crc32fast::hash(&bytes[..crc_offset]);
    if expected != computed {
        return Err(CodecError::CrcMismatch { expected, computed });
    }

    let metadata: Value = serde_json::from_slice(metadata_bytes)?;
    Ok(ContainerPayload {
        payload: payload.to_vec(),
        metadata,
        flags,
        version,
    })
}

/// Whether `bytes` starts with the container magic.
pub fn is_container(bytes: &[u8]) -> bool {
    bytes.len() >= CONTAINER_MAGIC.len() && bytes[..CONTAINER_MAGIC.len()] == CONTAINER_MAGIC
}

/// Overflow-safe reader over the container bytes.
struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Takes the next `len` bytes, reporting how far the remainder falls
    /// short when it does.
    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let available = self.bytes.len() - self.position;
        if len > available {
            return Err(CodecError::ContainerTruncated {
                offset: self.position,
                needed: len,
                available,
            });
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    fn take_u16(&mut self) -> Result<u16, CodecError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn take_u32(&mut self) -> Result<u32, CodecError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONTAINER_FLAG_COMPRESSED;
    use serde_json::json;

    #[test]
    fn roundtrip_restores_all_fields() {
        let payload = [0x01u8, 0x02, 0x03];
        let metadata = json!({"name": "x"});
        let bytes = encode(&payload, &metadata, 0).unwrap();

        assert_eq!(&bytes[..4], b"JSTG");
        let crc = u32::from_be_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
        assert_eq!(crc, crc32fast::hash(&bytes[..bytes.len() - 4]));

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.payload, payload);
        assert_eq!(decoded.metadata, metadata);
        assert_eq!(decoded.flags, 0);
        assert_eq!(decoded.version, 1);
    }

    #[test]
    fn empty_payload_and_metadata_roundtrip() {
        let bytes = encode(&[], &json!({}), CONTAINER_FLAG_COMPRESSED).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert!(decoded.payload.is_empty());
        assert_eq!(decoded.metadata, json!({}));
        assert_eq!(decoded.flags, CONTAINER_FLAG_COMPRESSED);
    }

    #[test]
    fn perturbed_crc_is_detected() {
        let mut bytes = encode(&[0xAA, 0xBB], &json!({"k": 1}), 0).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = bytes[last].wrapping_add(1);
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn corrupted_payload_byte_fails_the_crc() {
        let mut bytes = encode(&[0xAA, 0xBB, 0xCC], &json!({}), 0).unwrap();
        let payload_at = bytes.len() - 5;
        bytes[payload_at] ^= 0x10;
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = encode(&[1], &json!({}), 0).unwrap();
        bytes[0] = b'X';
        match decode(&bytes) {
            Err(CodecError::ContainerMagicMismatch { found }) => {
                assert_eq!(&found, b"XSTG");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn future_version_is_rejected() {
        let mut bytes = encode(&[1], &json!({}), 0).unwrap();
        bytes[4] = 2;
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::ContainerVersionMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn declared_lengths_are_bounds_checked() {
        let bytes = encode(&[1, 2, 3, 4], &json!({"a": true}), 0).unwrap();
        // Cutting inside the payload makes the length field overrun.
        let cut = &bytes[..bytes.len() - 6];
        assert!(matches!(
            decode(cut),
            Err(CodecError::ContainerTruncated { .. })
        ));
    }

    #[test]
    fn malformed_metadata_json_is_an_error() {
        // Hand-build a container whose metadata bytes are not JSON.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"JSTG");
        bytes.push(1);
        bytes.push(0);
        bytes.extend_from_slice(&2u16.to_be_bytes());
        bytes.extend_from_slice(b"{x");
        bytes.extend_from_slice(&0u32.to_be_bytes());
        let crc = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(CodecError::ContainerMetadataInvalid(_))
        ));
    }

    #[test]
    fn oversized_metadata_is_rejected_before_allocation() {
        let metadata = Value::String("m".repeat(70_000));
        assert!(matches!(
            encode(&[], &metadata, 0),
            Err(CodecError::MetadataTooLarge { .. })
        ));
    }

    #[test]
    fn magic_probe() {
        let bytes = encode(&[9], &json!({}), 0).unwrap();
        assert!(is_container(&bytes));
        assert!(!is_container(b"JST"));
        assert!(!is_container(b"\xFF\xD8\xFF\xE0"));
    }

    #[test]
    fn crc_implements_the_reflected_polynomial() {
        // Reference value for "123456789" under CRC-32/ISO-HDLC.
        assert_eq!(crc32fast::hash(b"123456789"), 0xCBF4_3926);
    }
}
