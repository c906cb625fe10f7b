use crate::constants::LIST_NAME_REGEX;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::cwd::DirectoryChange;
use crate::core_transfer::engine::read_until_close;
use crate::helpers::{decode_dropping_invalid, parent_directory};
use crate::session::Session;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::future::Future;
use std::pin::Pin;

lazy_static! {
    static ref LIST_NAME: Regex = Regex::new(LIST_NAME_REGEX).unwrap();
}

type WalkFuture<'a> = Pin<Box<dyn Future<Output = FtpResult<()>> + Send + 'a>>;

/// Names in a raw LIST output that may be subdirectories.
///
/// LIST output is server-defined; this takes the last space-separated word of
/// each line and lets CWD decide whether it really is a directory.
pub fn child_directory_candidates(listing: &str) -> Vec<String> {
    LIST_NAME
        .captures_iter(listing)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| *name != "." && *name != "..")
        .map(str::to_string)
        .collect()
}

impl Session {
    /// Handles `ls` and `ls -r [DEPTH]`.
    ///
    /// A recursive listing is depth-first and pre-order: every directory's
    /// listing comes before those of its children, each child preceded by its
    /// absolute path. `max_depth` of `None` means unbounded, `Some(0)` lists
    /// only the current directory.
    pub async fn list(&mut self, recursive: bool, max_depth: Option<u32>) -> FtpResult<String> {
        self.require_authenticated()?;

        let mut output = String::new();
        if recursive {
            self.walk(max_depth, &mut output).await?;
        } else {
            output.push_str(&self.list_current().await?);
            output.push('\n');
        }
        Ok(output)
    }

    /// One LIST of the current directory over a fresh data channel.
    async fn list_current(&mut self) -> FtpResult<String> {
        let channel = self.open_data_channel().await?;
        let reply = self.send("LIST", None).await?;
        if reply.is_success() {
            debug!("LIST finished without a data transfer: {}", reply.text().trim_end());
            return Ok(String::new());
        }
        if !reply.is_preliminary() {
            return Err(FtpError::rejected(
                reply.code().unwrap_or(0),
                reply.text().trim_end(),
            ));
        }

        let mut stream = match channel.establish(self.timeout()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.discard_pending_reply().await;
                return Err(e);
            }
        };
        let received = read_until_close(&mut stream, self.timeout(), self.chunk_size()).await;
        drop(stream);

        match received {
            Ok(bytes) => {
                self.read_reply().await?;
                Ok(decode_dropping_invalid(&bytes))
            }
            Err(e) => {
                self.discard_pending_reply().await;
                Err(e)
            }
        }
    }

    fn walk<'a>(&'a mut self, depth: Option<u32>, output: &'a mut String) -> WalkFuture<'a> {
        Box::pin(async move {
            let listing = self.list_current().await?;
            output.push_str(&listing);
            output.push('\n');

            if depth == Some(0) {
                return Ok(());
            }
            let next_depth = depth.map(|d| d - 1);

            for name in child_directory_candidates(&listing) {
                let path = match self.enter_directory(&name).await? {
                    DirectoryChange::NotADirectory => continue,
                    DirectoryChange::Entered(path) => path,
                };
                info!("Listing {}", path);
                output.push_str(&path);
                output.push('\n');

                // The parent must be restored even when the subtree failed.
                let walked = self.walk(next_depth, output).await;
                self.change_dir(&parent_directory(&path)).await?;
                walked?;
            }
            Ok(())
        })
    }
}
