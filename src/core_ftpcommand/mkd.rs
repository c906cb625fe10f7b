use crate::core_error::{FtpError, FtpResult};
use crate::core_network::Reply;
use crate::session::Session;

impl Session {
    /// Handles MKD.
    pub async fn make_dir(&mut self, name: &str) -> FtpResult<Reply> {
        let reply = self.send("MKD", Some(name)).await?;
        if !reply.is_success() {
            return Err(FtpError::DirectoryChangeFailure(format!(
                "Cannot make directory {}: {}",
                name,
                reply.text().trim_end()
            )));
        }
        Ok(reply)
    }
}
