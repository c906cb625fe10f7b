use crate::core_error::FtpResult;
use crate::core_network::Reply;
use crate::session::Session;

impl Session {
    /// Sends DELE and hands back whatever the server answered.
    pub async fn delete_file(&mut self, name: &str) -> FtpResult<Reply> {
        self.send("DELE", Some(name)).await
    }
}
