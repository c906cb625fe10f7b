use crate::core_error::{FtpError, FtpResult};
use crate::core_network::Reply;
use crate::session::Session;
use log::debug;

/// Result of trying to step into a listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryChange {
    /// Now inside the directory; holds its absolute path as reported by PWD.
    Entered(String),
    /// CWD was refused, so the entry is a file or is not accessible.
    NotADirectory,
}

impl Session {
    pub async fn change_dir(&mut self, path: &str) -> FtpResult<Reply> {
        let reply = self.send("CWD", Some(path)).await?.require_complete("CWD")?;
        if !reply.is_success() {
            return Err(FtpError::DirectoryChangeFailure(format!(
                "{}: {}",
                path,
                reply.text().trim_end()
            )));
        }
        Ok(reply)
    }

    /// CWD into `name` and report where that landed.
    ///
    /// A refused CWD is an expected outcome here, not an error.
    pub async fn enter_directory(&mut self, name: &str) -> FtpResult<DirectoryChange> {
        match self.change_dir(name).await {
            Ok(_) => {}
            Err(FtpError::DirectoryChangeFailure(reason)) => {
                debug!("Skipping {}: {}", name, reason);
                return Ok(DirectoryChange::NotADirectory);
            }
            Err(e) => return Err(e),
        }
        let path = self.current_dir().await?;
        Ok(DirectoryChange::Entered(path))
    }
}
