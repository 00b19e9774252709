//! Async framing over a byte stream: `u32` little-endian length, then payload.

use crate::error::{ServerError, ServerResult};
use shared::{encode_frame, Packet, MAX_FRAME_LEN};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads the next frame payload.
///
/// Returns `Ok(None)` on a clean end of stream between frames. A length above
/// [`MAX_FRAME_LEN`] is an error: the stream can no longer be trusted.
pub async fn read_frame<R>(reader: &mut R) -> ServerResult<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32_le().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if len > MAX_FRAME_LEN {
        return Err(ServerError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

/// Encodes and writes one packet.
pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> ServerResult<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
