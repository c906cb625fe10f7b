use crate::core_error::FtpResult;
use crate::core_network::Reply;
use crate::session::Session;

impl Session {
    /// Server-side HELP, optionally about one command. The reply is usually multi-line.
    pub async fn server_help(&mut self, topic: Option<&str>) -> FtpResult<Reply> {
        self.send("HELP", topic).await
    }
}
