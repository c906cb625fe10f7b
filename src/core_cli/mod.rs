pub mod core_cli;
pub mod progress;
pub mod repl;

pub use self::core_cli::{Cli, Target};
