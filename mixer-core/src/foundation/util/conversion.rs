use crate::foundation::MixError;

pub fn usize_to_u32(value: usize) -> Result<u32, MixError> {
    u32::try_from(value).map_err(|_| MixError::Message(format!("usize {value} does not fit into u32")))
}

pub fn u32_to_usize(value: u32) -> usize {
    // u32 always fits on the 32/64-bit targets this crate builds for.
    value as usize
}
