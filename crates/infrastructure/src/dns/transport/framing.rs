//! RFC 1035 §4.2.2 stream framing: each message is preceded by its length
//! as a 2-byte big-endian integer.

use dnsmux_domain::DomainError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const MAX_MESSAGE_SIZE: usize = 65535;

pub async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::Transport(format!(
            "Message too large: {} bytes (max {})",
            message_bytes.len(),
            MAX_MESSAGE_SIZE
        ))
    })?;

    // One write keeps prefix and body in the same TLS record.
    let mut frame = Vec::with_capacity(2 + message_bytes.len());
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(message_bytes);

    stream
        .write_all(&frame)
        .await
        .map_err(|e| DomainError::Transport(format!("Failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::Transport(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

pub async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.map_err(|e| {
        DomainError::Transport(format!("Failed to read response length: {}", e))
    })?;

    let response_len = usize::from(u16::from_be_bytes(len_buf));

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await.map_err(|e| {
        DomainError::Transport(format!("Failed to read response body: {}", e))
    })?;

    Ok(response)
}
