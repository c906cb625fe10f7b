// Error kinds surfaced by the FTP session engine
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Login is incorrect: {0}")]
    LoginFailure(String),

    #[error("Active mode is not available: {0}")]
    PortNegotiationFailure(String),

    #[error("Cannot change directory: {0}")]
    DirectoryChangeFailure(String),

    #[error("You have no permission: {0}. Please, relogin")]
    PermissionFailure(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Server rejected command ({code}): {message}")]
    CommandRejected { code: u16, message: String },

    #[error("Please specify the type")]
    MissingType,

    #[error("This data type does not exist: {0}")]
    UnsupportedType(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Session is closed")]
    SessionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FtpResult<T> = Result<T, FtpError>;

impl FtpError {
    /// Errors after which the control connection can no longer be used.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            FtpError::ConnectionFailure(_) | FtpError::SessionClosed
        )
    }

    /// Errors the interactive loop answers with a new USER/PASS exchange.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            FtpError::PermissionFailure(_) | FtpError::LoginFailure(_) | FtpError::NotAuthenticated
        )
    }

    pub fn rejected(code: u16, message: impl Into<String>) -> Self {
        FtpError::CommandRejected {
            code,
            message: message.into(),
        }
    }
}
