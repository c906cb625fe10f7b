pub mod engine;
pub mod io;
pub mod progress;

pub use io::{ByteSink, ByteSource, FileSource};
pub use progress::Progress;
