use super::messages::MixMessage;
use crate::foundation::{MixError, MAX_FRAME_SIZE_BYTES, PROTOCOL_VERSION};
use bincode::Options;

fn options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding().with_limit(MAX_FRAME_SIZE_BYTES as u64)
}

/// Encodes a frame body: little-endian protocol version followed by the bincode message.
pub fn encode_message(message: &MixMessage) -> Result<Vec<u8>, MixError> {
    let bytes = options().serialize(message).map_err(|err| crate::serde_err!("bincode", err))?;
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.extend_from_slice(&PROTOCOL_VERSION.to_le_bytes());
    out.extend_from_slice(&bytes);
    if out.len() > MAX_FRAME_SIZE_BYTES {
        return Err(MixError::MessageTooLarge { size: out.len(), max: MAX_FRAME_SIZE_BYTES });
    }
    Ok(out)
}

pub fn decode_message(bytes: &[u8]) -> Result<MixMessage, MixError> {
    if bytes.len() < 2 {
        return Err(MixError::EncodingError("frame too short".to_string()));
    }
    let version = u16::from_le_bytes([bytes[0], bytes[1]]);
    if version != PROTOCOL_VERSION {
        return Err(MixError::EncodingError(format!("wire protocol version mismatch: expected {PROTOCOL_VERSION}, got {version}")));
    }
    options().deserialize(&bytes[2..]).map_err(|err| crate::serde_err!("bincode", err))
}
