//! Wire transport: message types, frame codec and TCP helpers.

pub mod encoding;
pub mod framed;
pub mod messages;
pub mod tcp;

pub use framed::{FrameReader, FrameWriter};
pub use messages::{MessageKind, MixMessage};
