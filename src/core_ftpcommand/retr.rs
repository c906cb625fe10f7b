use crate::core_error::{FtpError, FtpResult};
use crate::core_network::Reply;
use crate::core_transfer::engine::receive_into;
use crate::core_transfer::{ByteSink, Progress};
use crate::session::{Representation, Session};
use log::{info, warn};

impl Session {
    /// Downloads `remote` into `sink`.
    ///
    /// Switches to BINARY, asks SIZE for the progress total (a failure only
    /// leaves the total unknown), negotiates a data channel and sends RETR.
    /// Only a 1xx answer lets the transfer start; the data connection is read
    /// until the server closes it and the final 226-class reply is returned.
    ///
    /// # Arguments
    ///
    /// * `remote` - The remote file name.
    /// * `sink` - Where the received bytes are written.
    /// * `progress` - Called after every chunk and once more on completion.
    pub async fn retrieve<S, P>(&mut self, remote: &str, sink: &mut S, progress: &mut P) -> FtpResult<Reply>
    where
        S: ByteSink + ?Sized,
        P: FnMut(&Progress) + ?Sized,
    {
        self.require_authenticated()?;
        self.switch_to(Representation::Binary).await?;

        let total = match self.size(remote).await {
            Ok(size) => size,
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => {
                warn!("SIZE {} failed, transferring without a total: {}", remote, e);
                0
            }
        };

        let channel = self.open_data_channel().await?;
        let reply = self.send("RETR", Some(remote)).await?;
        if !reply.is_preliminary() {
            return Err(FtpError::FileNotFound(format!(
                "{}: {}",
                remote,
                reply.text().trim_end()
            )));
        }

        let mut stream = match channel.establish(self.timeout()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.discard_pending_reply().await;
                return Err(e);
            }
        };
        let received = receive_into(
            &mut stream,
            sink,
            total,
            self.timeout(),
            self.chunk_size(),
            progress,
        )
        .await;
        drop(stream);

        let received = match received {
            Ok(bytes) => bytes,
            Err(e) => {
                self.discard_pending_reply().await;
                return Err(e);
            }
        };

        let done = self.read_reply().await?;
        info!("Downloaded {} ({} bytes)", remote, received);
        Ok(done)
    }
}
