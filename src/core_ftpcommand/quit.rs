use crate::core_error::FtpResult;
use crate::core_network::Reply;
use crate::session::Session;
use log::{error, info};

impl Session {
    /// Sends QUIT, shuts the control socket down and closes the session.
    ///
    /// The session ends up `Closed` even when QUIT fails; calling this on an
    /// already closed session is a no-op.
    pub async fn disconnect(&mut self) -> FtpResult<Option<Reply>> {
        if self.is_closed() {
            return Ok(None);
        }

        let reply = match self.send("QUIT", None).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!("Failed to send QUIT: {}", e);
                None
            }
        };

        self.shutdown_control().await;
        self.close();
        info!("Session closed");
        Ok(reply)
    }
}
