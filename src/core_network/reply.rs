//! Reply framing for the control connection.
//!
//! A reply is accumulated chunk by chunk until the newest chunk contains a
//! line of the form `NNN text`. Continuation lines (`NNN-text` or anything not
//! anchored on three digits and a space) keep the reader going.

use crate::constants::{CHUNK_SIZE, FINAL_LINE_REGEX};
use crate::core_error::{FtpError, FtpResult};
use crate::helpers::decode_dropping_invalid;
use lazy_static::lazy_static;
use log::{trace, warn};
use regex::Regex;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

lazy_static! {
    static ref FINAL_LINE: Regex = Regex::new(FINAL_LINE_REGEX).unwrap();
}

/// First digit of a reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    Preliminary,
    Success,
    Intermediate,
    TransientFailure,
    PermanentFailure,
}

/// Raw text received for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    text: String,
    complete: bool,
}

impl Reply {
    pub fn new(text: impl Into<String>, complete: bool) -> Self {
        Self {
            text: text.into(),
            complete,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines().map(|l| l.trim_end_matches('\r'))
    }

    /// False when the reader gave up (timeout or peer close) before a final line.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The three-digit code taken from the first three characters of the reply.
    pub fn code(&self) -> Option<u16> {
        let head = self.text.get(..3)?;
        if !head.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        head.parse().ok()
    }

    pub fn class(&self) -> Option<ReplyClass> {
        match self.code()? / 100 {
            1 => Some(ReplyClass::Preliminary),
            2 => Some(ReplyClass::Success),
            3 => Some(ReplyClass::Intermediate),
            4 => Some(ReplyClass::TransientFailure),
            5 => Some(ReplyClass::PermanentFailure),
            _ => None,
        }
    }

    pub fn is_preliminary(&self) -> bool {
        self.class() == Some(ReplyClass::Preliminary)
    }

    pub fn is_success(&self) -> bool {
        self.class() == Some(ReplyClass::Success)
    }

    pub fn is_intermediate(&self) -> bool {
        self.class() == Some(ReplyClass::Intermediate)
    }

    /// Fails with `Timeout` when the reader returned a partial reply.
    pub fn require_complete(self, what: &str) -> FtpResult<Self> {
        if self.complete {
            Ok(self)
        } else {
            Err(FtpError::Timeout(format!("no complete reply to {}", what)))
        }
    }

    /// Turns any non-2xx reply into `CommandRejected`.
    pub fn require_success(self) -> FtpResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FtpError::rejected(
                self.code().unwrap_or(0),
                self.text.trim_end(),
            ))
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Byte offset just past the first final line in `chunk`, if any.
fn final_line_end(chunk: &str) -> Option<usize> {
    let found = FINAL_LINE.find(chunk)?;
    let end = found.end();
    if chunk[end..].starts_with('\n') {
        Some(end + 1)
    } else {
        Some(end)
    }
}

/// Frames replies out of the read half of the control socket.
pub struct ReplyReader<R> {
    reader: R,
    buffer: Vec<u8>,
    read_timeout: Duration,
    // Text that arrived after the final line of the previous reply.
    carry: String,
}

impl<R: AsyncRead + Unpin> ReplyReader<R> {
    pub fn new(reader: R, read_timeout: Duration) -> Self {
        Self {
            reader,
            buffer: vec![0; CHUNK_SIZE],
            read_timeout,
            carry: String::new(),
        }
    }

    /// Reads one reply.
    ///
    /// Only the most recent chunk is tested for the final-line pattern, so a
    /// final line split across two reads is only noticed when the read times
    /// out. On timeout, error or peer close the text gathered so far is
    /// returned as an incomplete reply; with nothing gathered the call fails.
    pub async fn read_reply(&mut self) -> FtpResult<Reply> {
        let mut reply = String::new();
        let mut chunk = std::mem::take(&mut self.carry);

        loop {
            if !chunk.is_empty() {
                if let Some(end) = final_line_end(&chunk) {
                    self.carry = chunk.split_off(end);
                    reply.push_str(&chunk);
                    trace!("<<< {}", reply.trim_end());
                    return Ok(Reply::new(reply, true));
                }
                reply.push_str(&chunk);
            }

            let n = match timeout(self.read_timeout, self.reader.read(&mut self.buffer)).await {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    if reply.is_empty() {
                        return Err(FtpError::ConnectionFailure(e.to_string()));
                    }
                    warn!("Control read failed mid-reply: {}", e);
                    return Ok(Reply::new(reply, false));
                }
                Err(_) => {
                    if reply.is_empty() {
                        return Err(FtpError::Timeout("waiting for server reply".into()));
                    }
                    warn!("Reply timed out, returning partial text: {:?}", reply);
                    return Ok(Reply::new(reply, false));
                }
            };

            if n == 0 {
                if reply.is_empty() {
                    return Err(FtpError::ConnectionFailure(
                        "server closed the control connection".into(),
                    ));
                }
                return Ok(Reply::new(reply, false));
            }
            chunk = decode_dropping_invalid(&self.buffer[..n]);
        }
    }
}
