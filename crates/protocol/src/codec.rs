//! Length-prefixed bincode framing.
//!
//! Every frame on the wire is a big-endian `u32` payload length followed by
//! the bincode encoding of a [`Frame`](crate::protocol::Frame). Framing is
//! done by [`LengthDelimitedCodec`]; this module only adds the bincode layer
//! and the size limit.

use crate::error::CodecError;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

/// Upper bound on a single frame payload.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

pub type FrameReader<R> = FramedRead<R, LengthDelimitedCodec>;
pub type FrameWriter<W> = FramedWrite<W, LengthDelimitedCodec>;

fn framing() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LEN)
        .new_codec()
}

pub fn reader<R: AsyncRead>(inner: R) -> FrameReader<R> {
    FramedRead::new(inner, framing())
}

pub fn writer<W: AsyncWrite>(inner: W) -> FrameWriter<W> {
    FramedWrite::new(inner, framing())
}

/// Serialize a message into a frame payload (without the length header).
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes, CodecError> {
    let payload = bincode::serialize(message)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(CodecError::FrameTooLarge(payload.len(), MAX_FRAME_LEN));
    }
    Ok(Bytes::from(payload))
}

pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, CodecError> {
    Ok(bincode::deserialize(payload)?)
}

/// Encode and send one message, flushing the writer.
pub async fn send<W, T>(writer: &mut FrameWriter<W>, message: &T) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    writer.send(encode(message)?).await?;
    Ok(())
}

/// Receive the next message. Returns `Ok(None)` on a clean end of stream.
pub async fn recv<R, T>(reader: &mut FrameReader<R>) -> Result<Option<T>, CodecError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    match reader.next().await {
        Some(frame) => decode(&frame?).map(Some),
        None => Ok(None),
    }
}
