use crate::constants::PASV_REGEX;
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::channel::CommandChannel;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

lazy_static! {
    static ref PASV_NUMBERS: Regex = Regex::new(PASV_REGEX).unwrap();
}

/// Parses `h1,h2,h3,h4,p1,p2` out of a 227 reply.
pub fn parse_pasv_reply(text: &str) -> FtpResult<SocketAddr> {
    let caps = PASV_NUMBERS.captures(text).ok_or_else(|| {
        FtpError::ProtocolViolation(format!("malformed PASV reply: {}", text.trim_end()))
    })?;

    let mut numbers = [0u8; 6];
    for (i, slot) in numbers.iter_mut().enumerate() {
        *slot = caps[i + 1].parse::<u8>().map_err(|_| {
            FtpError::ProtocolViolation(format!("PASV number out of range: {}", &caps[i + 1]))
        })?;
    }

    let ip = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = numbers[4] as u16 * 256 + numbers[5] as u16;
    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

/// Sends PASV and connects to the endpoint the server advertises.
pub async fn connect_pasv<R, W>(
    channel: &mut CommandChannel<R, W>,
    connect_timeout: Duration,
) -> FtpResult<TcpStream>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let reply = channel.send("PASV", None).await?.require_complete("PASV")?;
    if !reply.is_success() {
        return Err(FtpError::rejected(
            reply.code().unwrap_or(0),
            reply.text().trim_end(),
        ));
    }
    let addr = parse_pasv_reply(reply.text())?;
    debug!("Connecting PASV data channel to {}", addr);

    let stream = timeout(connect_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| FtpError::Timeout(format!("PASV data connect to {}", addr)))?
        .map_err(|e| FtpError::ConnectionFailure(format!("PASV data connect to {}: {}", addr, e)))?;
    Ok(stream)
}
