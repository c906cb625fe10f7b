// Here's the list of the FTP commands implemented
pub mod cwd;
pub mod dele;
pub mod ftpcommand;
pub mod handlers;
pub mod help;
pub mod list;
pub mod mkd;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod rmd;
pub mod rnfr;
pub mod size;
pub mod stor;
pub mod type_;
pub mod user;

pub use cwd::DirectoryChange;
pub use handlers::{dispatch, Outcome};
