//! Length-prefixed frames over any async byte stream.
//!
//! ```text
//! | u32 BE body length | u16 LE version | bincode(MixMessage) |
//! ```

use super::encoding::{decode_message, encode_message};
use super::messages::MixMessage;
use crate::foundation::{MixError, MAX_FRAME_SIZE_BYTES};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub struct FrameReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads the next message. `Ok(None)` means the peer closed cleanly between frames.
    pub async fn read_message(&mut self) -> Result<Option<MixMessage>, MixError> {
        let mut len_buf = [0u8; 4];
        let mut filled = 0;
        while filled < len_buf.len() {
            match self.inner.read(&mut len_buf[filled..]).await {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => return Err(MixError::connection("read_frame_length", format!("eof after {filled} of 4 length bytes"))),
                Ok(read) => filled += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(MixError::connection("read_frame_length", err)),
            }
        }
        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_SIZE_BYTES {
            return Err(MixError::MessageTooLarge { size: len, max: MAX_FRAME_SIZE_BYTES });
        }
        let mut body = vec![0u8; len];
        self.inner.read_exact(&mut body).await.map_err(|err| MixError::connection("read_frame_body", err))?;
        decode_message(&body).map(Some)
    }
}

pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn write_message(&mut self, message: &MixMessage) -> Result<(), MixError> {
        let body = encode_message(message)?;
        let len = u32::try_from(body.len()).map_err(|_| MixError::MessageTooLarge { size: body.len(), max: MAX_FRAME_SIZE_BYTES })?;
        let mut frame = Vec::with_capacity(body.len() + 4);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&body);
        self.inner.write_all(&frame).await.map_err(|err| MixError::connection("write_frame", err))?;
        self.inner.flush().await.map_err(|err| MixError::connection("flush_frame", err))
    }

    pub async fn shutdown(&mut self) -> Result<(), MixError> {
        self.inner.shutdown().await.map_err(|err| MixError::connection("shutdown", err))
    }
}
