// core_ftpcommand/size.rs

use crate::core_error::{FtpError, FtpResult};
use crate::session::Session;
use log::info;

impl Session {
    /// Handles the SIZE command.
    ///
    /// Asks the server for the size of a remote file. The reply must be a
    /// complete 2xx reply carrying a number after the status code.
    ///
    /// # Arguments
    ///
    /// * `remote` - The name of the remote file.
    ///
    /// # Returns
    ///
    /// The size in bytes, `FileNotFound` for a non-2xx reply, or
    /// `ProtocolViolation` when the reply has no digits.
    pub async fn size(&mut self, remote: &str) -> FtpResult<u64> {
        let reply = self.send("SIZE", Some(remote)).await?.require_complete("SIZE")?;
        if !reply.is_success() {
            return Err(FtpError::FileNotFound(format!(
                "{}: {}",
                remote,
                reply.text().trim_end()
            )));
        }

        let size = parse_size_reply(reply.text())?;
        info!("File size for {} is {}", remote, size);
        Ok(size)
    }
}

fn parse_size_reply(text: &str) -> FtpResult<u64> {
    text.get(4..)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|digits| digits.parse::<u64>().ok())
        .ok_or_else(|| FtpError::ProtocolViolation(format!("no size in reply: {}", text.trim_end())))
}
