// src/constants.rs

pub const DEFAULT_PORT: u16 = 21;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const CHUNK_SIZE: usize = 64 * 1024;

pub const DEFAULT_USERNAME: &str = "ftp";
pub const DEFAULT_PASSWORD: &str = "ftp";
pub const ANONYMOUS_USERNAME: &str = "anonymous";
pub const ANONYMOUS_PASSWORD: &str = "qwerty";

/// A reply is complete once a line starts with three digits and a space.
pub const FINAL_LINE_REGEX: &str = r"(?m)^\d{3} .*$";
pub const PASV_REGEX: &str = r"(\d+),(\d+),(\d+),(\d+),(\d+),(\d+)";
/// Best-effort child name extraction from raw LIST output.
pub const LIST_NAME_REGEX: &str = r" ([\w.]+)\r\n";

pub const PROGRESS_BAR_WIDTH: usize = 20;
pub const SPEED_UNITS: [&str; 4] = ["B/s", "KB/s", "MB/s", "GB/s"];
