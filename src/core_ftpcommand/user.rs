use crate::core_error::{FtpError, FtpResult};
use crate::core_network::Reply;
use crate::session::{Session, SessionState};
use log::{info, warn};

impl Session {
    /// Logs in with USER/PASS.
    ///
    /// A 2xx reply to USER logs in without a password. On a refused PASS the
    /// session stays (or falls back to) `Connected` so the login can be retried.
    pub async fn login(&mut self, username: &str, password: &str) -> FtpResult<Reply> {
        match self.state() {
            SessionState::Connected | SessionState::Authenticated => {}
            SessionState::Closed => return Err(FtpError::SessionClosed),
            SessionState::Disconnected => {
                return Err(FtpError::ConnectionFailure("not connected".into()))
            }
        }

        let user_reply = self.send("USER", Some(username)).await?.require_complete("USER")?;
        let reply = if user_reply.is_success() {
            user_reply
        } else if user_reply.is_intermediate() {
            self.send("PASS", Some(password)).await?.require_complete("PASS")?
        } else {
            self.set_state(SessionState::Connected);
            warn!("USER {} rejected: {}", username, user_reply.text().trim_end());
            return Err(FtpError::LoginFailure(user_reply.text().trim_end().to_string()));
        };

        if !reply.is_success() {
            self.set_state(SessionState::Connected);
            warn!("Login for {} refused: {}", username, reply.text().trim_end());
            return Err(FtpError::LoginFailure(reply.text().trim_end().to_string()));
        }

        self.set_state(SessionState::Authenticated);
        info!("Logged in as {}", username);
        Ok(reply)
    }
}
