use crate::core_error::{FtpError, FtpResult};
use crate::core_network::Reply;
use crate::session::Session;

impl Session {
    pub async fn remove_dir(&mut self, name: &str) -> FtpResult<Reply> {
        let reply = self.send("RMD", Some(name)).await?;
        if !reply.is_success() {
            return Err(FtpError::DirectoryChangeFailure(format!(
                "Cannot remove directory {}: {}",
                name,
                reply.text().trim_end()
            )));
        }
        Ok(reply)
    }
}
