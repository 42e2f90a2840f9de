use serde::Serialize;
use std::io::{self, Read};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame a helper may send back (host -> client).
pub const MAX_FROM_HOST: usize = 1_048_576; // 1 MB
/// Largest frame we are willing to send to a helper (client -> host).
pub const MAX_TO_HOST: usize = 64 * 1_048_576; // 64 MB

#[inline]
fn read_exact_u32_len<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf)?;
    Ok(u32::from_ne_bytes(len_buf))
}

#[inline]
fn check_len(len: usize, max_size: usize) -> io::Result<()> {
    if len > max_size.min(MAX_FROM_HOST) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "incoming message too large",
        ));
    }
    Ok(())
}

/// Encode any serde-serializable value into the native-messaging frame:
/// 4-byte native-endian length + JSON bytes.
pub fn encode_message<T: Serialize + ?Sized>(msg: &T) -> io::Result<Vec<u8>> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_TO_HOST {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "outgoing message exceeds 64MB",
        ));
    }
    let mut out = Vec::with_capacity(4 + json.len());
    out.extend_from_slice(&(json.len() as u32).to_ne_bytes());
    out.extend_from_slice(&json);
    Ok(out)
}

/// Decode a single framed message from a blocking reader.
pub fn decode_message<R: Read>(reader: &mut R, max_size: usize) -> io::Result<String> {
    let len = read_exact_u32_len(&mut *reader)? as usize;
    check_len(len, max_size)?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Read one frame from an async reader.
///
/// Returns `Ok(None)` when the stream ends cleanly on a frame boundary, which is
/// how a helper process that exited looks from this side of the pipe. Running out
/// of bytes inside a header or body is `UnexpectedEof`.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_size: usize,
) -> io::Result<Option<String>> {
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = reader.read(&mut len_buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended inside a frame header",
            ));
        }
        filled += n;
    }

    let len = u32::from_ne_bytes(len_buf) as usize;
    check_len(len, max_size)?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Encode `msg` and write it as a single frame, flushing afterwards.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let frame = encode_message(msg)?;
    writer.write_all(&frame).await?;
    writer.flush().await
}
