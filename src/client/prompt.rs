//! Interactive room prompt shown on Ctrl-C.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Print `Channel: ` and read one line. Returns `None` on end of input or a
/// blank answer.
pub async fn ask_room<R, W>(input: &mut R, output: &mut W) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(b"Channel: ").await?;
    output.flush().await?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let room = line.trim();
    Ok((!room.is_empty()).then(|| room.to_string()))
}
