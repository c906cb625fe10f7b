// src/core_ftpcommand/pwd.rs
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::Reply;
use crate::helpers::parse_quoted_path;
use crate::session::Session;

impl Session {
    /// Raw PWD reply. The working directory is never cached, every call asks the server.
    pub async fn print_dir(&mut self) -> FtpResult<Reply> {
        self.send("PWD", None).await?.require_complete("PWD")
    }

    /// The remote working directory, extracted from between the quotes of the PWD reply.
    pub async fn current_dir(&mut self) -> FtpResult<String> {
        let reply = self.print_dir().await?.require_success()?;
        parse_quoted_path(reply.text()).ok_or_else(|| {
            FtpError::ProtocolViolation(format!("no quoted path in PWD reply: {}", reply.text().trim_end()))
        })
    }
}
