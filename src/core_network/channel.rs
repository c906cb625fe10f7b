use crate::core_error::{FtpError, FtpResult};
use crate::core_network::reply::{Reply, ReplyReader};
use crate::helpers::{format_command_line, loggable_command};
use log::trace;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Request/reply correlation over the control connection.
///
/// Every `send` writes one line and then waits for the matching reply, so at
/// most one command is ever outstanding.
pub struct CommandChannel<R, W> {
    replies: ReplyReader<R>,
    writer: W,
}

impl<R, W> CommandChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, read_timeout: Duration) -> Self {
        Self {
            replies: ReplyReader::new(reader, read_timeout),
            writer,
        }
    }

    /// Sends `COMMAND [argument]` and returns the server's reply.
    pub async fn send(&mut self, command: &str, argument: Option<&str>) -> FtpResult<Reply> {
        let line = format_command_line(command, argument);
        trace!(">>> {}", loggable_command(command, argument));
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| FtpError::ConnectionFailure(format!("sending {}: {}", command, e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| FtpError::ConnectionFailure(format!("sending {}: {}", command, e)))?;
        self.replies.read_reply().await
    }

    /// Reads a reply without sending anything (greeting, transfer completion).
    pub async fn read_reply(&mut self) -> FtpResult<Reply> {
        self.replies.read_reply().await
    }

    pub async fn shutdown(&mut self) -> FtpResult<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
