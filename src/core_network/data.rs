use crate::core_error::{FtpError, FtpResult};
use log::debug;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// How data connections are opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    /// The client listens (PORT), the server connects.
    Active,
    /// The server listens (PASV), the client connects.
    Passive,
}

/// A negotiated data channel for exactly one transfer or listing.
pub enum DataChannel {
    Active(TcpListener),
    Passive(TcpStream),
}

impl DataChannel {
    /// Yields the connected stream.
    ///
    /// Must only be called after the transfer command got its 1xx reply. In
    /// active mode the listener is consumed here and closed once the single
    /// inbound connection has been accepted.
    pub async fn establish(self, accept_timeout: Duration) -> FtpResult<TcpStream> {
        match self {
            DataChannel::Passive(stream) => Ok(stream),
            DataChannel::Active(listener) => {
                let (stream, addr) = timeout(accept_timeout, listener.accept())
                    .await
                    .map_err(|_| FtpError::Timeout("waiting for the server data connection".into()))??;
                debug!("Accepted data connection from: {}", addr);
                Ok(stream)
            }
        }
    }
}
