use crate::config::ClientConfig;
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::{pasv, port, CommandChannel, DataChannel, DataMode, Reply};
use log::{debug, info, warn};
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Authenticated,
    /// Terminal; the control connection is gone.
    Closed,
}

/// Representation type negotiated with TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Ascii,
    Binary,
}

impl Representation {
    pub fn type_code(self) -> &'static str {
        match self {
            Representation::Ascii => "A",
            Representation::Binary => "I",
        }
    }
}

struct ControlConnection {
    channel: CommandChannel<OwnedReadHalf, OwnedWriteHalf>,
    local_ip: IpAddr,
}

/// One client session: the control connection plus the mode and type flags.
///
/// Commands are implemented in `core_ftpcommand`, one file per command.
pub struct Session {
    connection: Option<ControlConnection>,
    state: SessionState,
    mode: DataMode,
    representation: Representation,
    timeout: Duration,
    chunk_size: usize,
}

impl Session {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: None,
            state: SessionState::Disconnected,
            mode: if config.passive {
                DataMode::Passive
            } else {
                DataMode::Active
            },
            representation: Representation::Ascii,
            timeout: config.timeout(),
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Opens the control connection and returns the server greeting.
    pub async fn connect(&mut self, host: &str, port: u16) -> FtpResult<Reply> {
        match self.state {
            SessionState::Disconnected => {}
            SessionState::Closed => return Err(FtpError::SessionClosed),
            _ => {
                return Err(FtpError::ConnectionFailure(
                    "session is already connected".into(),
                ))
            }
        }

        let addr = format!("{}:{}", host, port);
        let stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| FtpError::ConnectionFailure(format!("connect to {} timed out", addr)))?
            .map_err(|e| FtpError::ConnectionFailure(format!("connect to {}: {}", addr, e)))?;
        stream.set_nodelay(true).ok();
        let local_ip = stream.local_addr()?.ip();
        let (reader, writer) = stream.into_split();

        self.connection = Some(ControlConnection {
            channel: CommandChannel::new(reader, writer, self.timeout),
            local_ip,
        });

        let greeting = self.read_reply().await?;
        for line in greeting.lines() {
            debug!("Banner: {}", line);
        }
        if !greeting.is_complete() {
            warn!("Greeting from {} is incomplete", addr);
        }
        if !greeting.is_success() {
            self.connection = None;
            return Err(FtpError::ConnectionFailure(format!(
                "server refused the session: {}",
                greeting.text().trim_end()
            )));
        }
        self.state = SessionState::Connected;
        info!("Connected to {} from {}", addr, local_ip);
        Ok(greeting)
    }

    fn channel(&mut self) -> FtpResult<&mut CommandChannel<OwnedReadHalf, OwnedWriteHalf>> {
        match (&mut self.connection, self.state) {
            (_, SessionState::Closed) => Err(FtpError::SessionClosed),
            (Some(connection), _) => Ok(&mut connection.channel),
            (None, _) => Err(FtpError::ConnectionFailure("not connected".into())),
        }
    }

    /// Sends one command and waits for its reply.
    pub async fn send(&mut self, command: &str, argument: Option<&str>) -> FtpResult<Reply> {
        self.channel()?.send(command, argument).await
    }

    /// Reads a reply that was not triggered by a new command.
    pub async fn read_reply(&mut self) -> FtpResult<Reply> {
        self.channel()?.read_reply().await
    }

    /// Best-effort read of the reply left pending by an aborted transfer,
    /// so that it is not mistaken for the answer to the next command.
    pub(crate) async fn discard_pending_reply(&mut self) {
        match self.read_reply().await {
            Ok(reply) => debug!("Discarded reply after failed transfer: {}", reply.text().trim_end()),
            Err(e) => debug!("No reply after failed transfer: {}", e),
        }
    }

    /// Negotiates a fresh data channel according to the current mode.
    ///
    /// A refused PORT switches the session to passive mode for good and the
    /// channel is negotiated again, once, through PASV.
    pub(crate) async fn open_data_channel(&mut self) -> FtpResult<DataChannel> {
        if self.mode == DataMode::Active {
            let local_ip = match &self.connection {
                Some(connection) => connection.local_ip,
                None => return Err(FtpError::ConnectionFailure("not connected".into())),
            };
            let negotiated = port::setup_port_listener(self.channel()?, local_ip).await;
            match negotiated {
                Ok(listener) => return Ok(DataChannel::Active(listener)),
                Err(FtpError::PortNegotiationFailure(reason)) => {
                    warn!("Active mode is not available ({}), switching to passive mode", reason);
                    self.mode = DataMode::Passive;
                }
                Err(e) => return Err(e),
            }
        }

        let connect_timeout = self.timeout;
        let stream = pasv::connect_pasv(self.channel()?, connect_timeout).await?;
        Ok(DataChannel::Passive(stream))
    }

    pub fn require_authenticated(&self) -> FtpResult<()> {
        match self.state {
            SessionState::Authenticated => Ok(()),
            SessionState::Closed => Err(FtpError::SessionClosed),
            _ => Err(FtpError::NotAuthenticated),
        }
    }

    /// Drops the control connection and enters the terminal state.
    pub(crate) fn close(&mut self) {
        self.connection = None;
        self.state = SessionState::Closed;
    }

    pub(crate) async fn shutdown_control(&mut self) {
        if let Some(connection) = self.connection.as_mut() {
            if let Err(e) = connection.channel.shutdown().await {
                debug!("Control shutdown failed: {}", e);
            }
        }
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn set_representation(&mut self, representation: Representation) {
        self.representation = representation;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DataMode) {
        self.mode = mode;
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
