//! Byte pumps between a data connection and local sinks/sources.

use crate::core_error::{FtpError, FtpResult};
use crate::core_transfer::io::{ByteSink, ByteSource};
use crate::core_transfer::progress::{Progress, ProgressTracker};
use log::{debug, warn};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// Copies the data connection into `sink` until the server closes it.
///
/// The advertised size only feeds progress; the loop ends on a zero-length
/// read regardless. `progress` is called after every chunk and once more with
/// `done == total` on completion.
pub async fn receive_into<D, S, P>(
    data: &mut D,
    sink: &mut S,
    advertised_total: u64,
    read_timeout: Duration,
    chunk_size: usize,
    progress: &mut P,
) -> FtpResult<u64>
where
    D: AsyncRead + Unpin,
    S: ByteSink + ?Sized,
    P: FnMut(&Progress) + ?Sized,
{
    let mut tracker = ProgressTracker::new(advertised_total);
    let mut buffer = vec![0; chunk_size];

    loop {
        let n = timeout(read_timeout, data.read(&mut buffer))
            .await
            .map_err(|_| FtpError::Timeout("reading from the data connection".into()))??;
        if n == 0 {
            break;
        }
        sink.write_all(&buffer[..n]).await?;
        progress(&tracker.advance(n));
    }

    sink.flush().await?;
    progress(&tracker.finish());
    debug!("Received {} bytes", tracker.bytes_done());
    Ok(tracker.bytes_done())
}

/// Copies `source` into the data connection, then shuts the connection down.
pub async fn send_from<D, S, P>(
    data: &mut D,
    source: &mut S,
    write_timeout: Duration,
    chunk_size: usize,
    progress: &mut P,
) -> FtpResult<u64>
where
    D: AsyncWrite + Unpin,
    S: ByteSource + ?Sized,
    P: FnMut(&Progress) + ?Sized,
{
    let mut tracker = ProgressTracker::new(source.size());
    let mut buffer = vec![0; chunk_size];

    loop {
        let n = source.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        timeout(write_timeout, data.write_all(&buffer[..n]))
            .await
            .map_err(|_| FtpError::Timeout("writing to the data connection".into()))??;
        progress(&tracker.advance(n));
    }

    data.shutdown().await?;
    progress(&tracker.finish());
    debug!("Sent {} bytes", tracker.bytes_done());
    Ok(tracker.bytes_done())
}

/// Reads a data connection until the peer closes it.
///
/// Used for listings whose length is unknown up front. A timeout ends the
/// read and keeps what arrived so far.
pub async fn read_until_close<D>(data: &mut D, read_timeout: Duration, chunk_size: usize) -> FtpResult<Vec<u8>>
where
    D: AsyncRead + Unpin,
{
    let mut collected = Vec::new();
    let mut buffer = vec![0; chunk_size];
    loop {
        match timeout(read_timeout, data.read(&mut buffer)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => collected.extend_from_slice(&buffer[..n]),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!("Listing timed out after {} bytes", collected.len());
                break;
            }
        }
    }
    Ok(collected)
}
