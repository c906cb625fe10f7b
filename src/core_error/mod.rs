pub mod error;

pub use error::{FtpError, FtpResult};
