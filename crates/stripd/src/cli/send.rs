//! `send` subcommand — fire one command datagram at a controller.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use super::{Result, StripCommand};
use stripd_lib::StripdError;

fn resolve(target: &str) -> Result<SocketAddr> {
    target
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| StripdError::Config(format!("cannot resolve \"{target}\"")))
}

/// Send `text` to `target`. Unless `no_check` is set, the text is parsed
/// first and the canonical form is sent instead.
///
/// The protocol has no replies, so success only means the datagram left.
pub(super) fn cmd_send(text: &str, target: &str, no_check: bool) -> Result<()> {
    let payload = if no_check {
        text.to_string()
    } else {
        text.parse::<StripCommand>()?.to_string()
    };

    let target = resolve(target)?;
    let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(local)?;
    socket.send_to(payload.as_bytes(), target)?;
    log::info!("sent {payload} to {target}");
    println!("{payload} -> {target}");
    Ok(())
}
