//! System-wide constants for the joint payment coordinator.

/// Wire protocol version carried in every frame.
pub const PROTOCOL_VERSION: u16 = 1;

/// Maximum encoded frame size (1 MiB).
pub const MAX_FRAME_SIZE_BYTES: usize = 1024 * 1024;

/// Minimum number of participants in a round.
pub const MIN_PLAYER_COUNT: usize = 2;

/// Maximum number of participants in a round.
pub const MAX_PLAYER_COUNT: usize = 256;

/// Per-connection outbound queue depth. A round sends at most two messages per participant.
pub const OUTBOUND_QUEUE_DEPTH: usize = 4;

/// Coordinator inbound event queue depth.
pub const COORDINATOR_EVENT_QUEUE_DEPTH: usize = 256;

/// Default deadline for all inputs to arrive once the first participant connects.
pub const DEFAULT_INPUT_TIMEOUT_SECS: u64 = 300;

/// Default deadline for all signatures once the partial transaction is out.
pub const DEFAULT_SIGNATURE_TIMEOUT_SECS: u64 = 120;

/// Default participant deadline for the final transaction after signing.
pub const DEFAULT_FINAL_TIMEOUT_SECS: u64 = 180;

/// Deadline for writers to flush the final Transaction before the round reports success.
pub const FINAL_FLUSH_TIMEOUT_SECS: u64 = 10;

/// Default TCP connect deadline for participants.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Upper bound accepted for any configured timeout (1 day).
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Default coordinator port.
pub const DEFAULT_COORDINATOR_PORT: u16 = 7341;

/// Schnorr signature size in bytes.
pub const SCHNORR_SIGNATURE_SIZE: usize = 64;

/// Schnorr public key size in bytes (x-only).
pub const SCHNORR_PUBKEY_SIZE: usize = 32;

/// Address payload length in bytes (truncated blake3 of the public key).
pub const ADDRESS_PAYLOAD_SIZE: usize = 20;

