use crate::foundation::{Hash32, MixError};

pub fn decode_hex(s: &str) -> Result<Vec<u8>, MixError> {
    hex::decode(s.trim().trim_start_matches("0x")).map_err(|e| e.into())
}

pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, MixError> {
    let bytes = decode_hex(s)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| MixError::EncodingError(format!("expected 32 bytes, got {len}")))
}
