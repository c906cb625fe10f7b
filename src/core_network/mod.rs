pub mod channel;
pub mod data;
pub mod pasv;
pub mod port;
pub mod reply;

pub use channel::CommandChannel;
pub use data::{DataChannel, DataMode};
pub use reply::{Reply, ReplyClass};
