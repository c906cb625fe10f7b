use crate::core_error::{FtpError, FtpResult};
use crate::core_network::channel::CommandChannel;
use log::{debug, info};
use std::net::{IpAddr, Ipv4Addr};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

/// Encodes an address as the `h1,h2,h3,h4,p1,p2` argument of PORT.
pub fn encode_port_argument(ip: Ipv4Addr, port: u16) -> String {
    let octets = ip.octets();
    format!(
        "{},{},{},{},{},{}",
        octets[0],
        octets[1],
        octets[2],
        octets[3],
        port / 256,
        port % 256
    )
}

/// Sets up an active mode (PORT) data channel.
///
/// Binds an ephemeral listener on the same local address as the control
/// connection and announces it with PORT. The listener is returned
/// unaccepted: the server only connects after the transfer command has been
/// answered with a 1xx reply.
pub async fn setup_port_listener<R, W>(
    channel: &mut CommandChannel<R, W>,
    local_ip: IpAddr,
) -> FtpResult<TcpListener>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ipv4 = match local_ip {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(_) => {
            return Err(FtpError::PortNegotiationFailure(
                "PORT requires an IPv4 control connection".into(),
            ))
        }
    };

    let listener = TcpListener::bind((ipv4, 0)).await?;
    let port = listener.local_addr()?.port();
    let argument = encode_port_argument(ipv4, port);
    debug!("PORT listener set up on IP: {}, Port: {}", ipv4, port);

    let reply = channel
        .send("PORT", Some(&argument))
        .await?
        .require_complete("PORT")?;
    if !reply.is_success() {
        info!("Server refused PORT {}: {}", argument, reply.text().trim_end());
        return Err(FtpError::PortNegotiationFailure(
            reply.text().trim_end().to_string(),
        ));
    }
    Ok(listener)
}
