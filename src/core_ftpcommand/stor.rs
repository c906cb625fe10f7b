use crate::core_error::{FtpError, FtpResult};
use crate::core_network::{Reply, ReplyClass};
use crate::core_transfer::engine::send_from;
use crate::core_transfer::{ByteSource, Progress};
use crate::session::{Representation, Session};
use log::info;

impl Session {
    /// Uploads `source` as `remote`.
    ///
    /// A 5xx answer to STOR is a permission problem and aborts before the data
    /// connection is used: in active mode nothing is ever accepted.
    pub async fn store<S, P>(&mut self, source: &mut S, remote: &str, progress: &mut P) -> FtpResult<Reply>
    where
        S: ByteSource + ?Sized,
        P: FnMut(&Progress) + ?Sized,
    {
        self.require_authenticated()?;
        self.switch_to(Representation::Binary).await?;

        let channel = self.open_data_channel().await?;
        let reply = self.send("STOR", Some(remote)).await?;
        match reply.class() {
            Some(ReplyClass::Preliminary) => {}
            Some(ReplyClass::PermanentFailure) => {
                return Err(FtpError::PermissionFailure(format!(
                    "STOR {}: {}",
                    remote,
                    reply.text().trim_end()
                )))
            }
            _ => {
                return Err(FtpError::rejected(
                    reply.code().unwrap_or(0),
                    reply.text().trim_end(),
                ))
            }
        }

        let mut stream = match channel.establish(self.timeout()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.discard_pending_reply().await;
                return Err(e);
            }
        };
        let sent = send_from(&mut stream, source, self.timeout(), self.chunk_size(), progress).await;
        drop(stream);

        let sent = match sent {
            Ok(bytes) => bytes,
            Err(e) => {
                self.discard_pending_reply().await;
                return Err(e);
            }
        };

        let done = self.read_reply().await?;
        info!("Uploaded {} ({} bytes)", remote, sent);
        Ok(done)
    }
}
