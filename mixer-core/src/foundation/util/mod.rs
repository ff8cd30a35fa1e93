pub mod abort;
pub mod conversion;
pub mod encoding;
pub mod time;

pub use abort::AbortSignal;
