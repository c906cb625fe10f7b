//! Local byte sinks and sources used by downloads and uploads.

use crate::helpers::base_name;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Where downloaded bytes go.
pub trait ByteSink: AsyncWrite + Unpin + Send {}

impl<T: AsyncWrite + Unpin + Send> ByteSink for T {}

/// Where uploaded bytes come from. `size` feeds the progress total.
pub trait ByteSource: AsyncRead + Unpin + Send {
    fn size(&self) -> u64;
}

impl ByteSource for Cursor<Vec<u8>> {
    fn size(&self) -> u64 {
        self.get_ref().len() as u64
    }
}

/// A local file opened for upload, with its length captured at open time.
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path.as_ref()).await?;
        let len = file.metadata().await?.len();
        Ok(Self { file, len })
    }
}

impl AsyncRead for FileSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}

impl ByteSource for FileSource {
    fn size(&self) -> u64 {
        self.len
    }
}

/// Local destination for a download.
///
/// No local path (or the word `current`) means the working directory; an
/// existing directory gets the remote file's base name appended.
pub fn resolve_download_path(remote: &str, local: Option<&str>) -> io::Result<PathBuf> {
    let target = match local {
        None | Some("current") => std::env::current_dir()?,
        Some(path) => PathBuf::from(path),
    };
    if target.is_dir() {
        Ok(target.join(base_name(remote)))
    } else {
        Ok(target)
    }
}

/// Remote name for an upload, defaulting to the local base name.
pub fn resolve_upload_name(local: &str, remote: Option<&str>) -> String {
    match remote {
        Some(name) => name.to_string(),
        None => base_name(local).to_string(),
    }
}
