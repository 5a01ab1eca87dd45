use super::Address;
use crate::common::error::Socks5Error;
use anyhow::{bail, Result};
use log::{debug, trace};
use socket2::{SockRef, TcpKeepalive};
use std::time::Duration;
use tokio::{net::TcpStream, time::timeout};

/// Different TCP connection options.
///
/// **Fields**:
/// * ```keep_alive``` - setting for TCP keepalive procedure
///
///
#[derive(Debug, Clone, Default)]
pub struct TcpConnectionOptions {
    keep_alive: Option<TcpKeepalive>,
}

impl TcpConnectionOptions {
    pub fn new() -> TcpConnectionOptions {
        TcpConnectionOptions { keep_alive: None }
    }

    pub fn set_keepalive(&mut self, keep_alive: TcpKeepalive) -> &mut TcpConnectionOptions {
        debug_assert!(self.keep_alive.is_none(), "should be unset");
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn apply_to(&self, tcp_stream: &mut TcpStream) -> Result<()> {
        let tcp_sock_ref = SockRef::from(&tcp_stream);

        if let Some(keep_alive) = &self.keep_alive {
            tcp_sock_ref.set_tcp_keepalive(keep_alive)?;
        }

        Ok(())
    }
}

/// Establish TCP connection with passed ```endpoint``` within ```connect_timeout```.
///
/// Resolution of a domain name endpoint counts against the same timeout. When the
/// timeout elapses, the pending connection is dropped and ```ConnectTimeout``` is
/// returned. Any transport failure is reported as ```ConnectFailed```.
///
/// Input ```tcp_opts``` are applied to created TCP socket right after stream creation.
pub async fn establish_tcp_connection_with_timeout(
    endpoint: &Address,
    connect_timeout: Duration,
    tcp_opts: &TcpConnectionOptions,
) -> Result<TcpStream> {
    let connect = async {
        // Resolve endpoint address.
        trace!("Endpoint address {} resolution: ... ", endpoint);
        let resolved = endpoint.to_socket_addr().await?;
        trace!("Endpoint address {} resolution: SUCCESS with {}", endpoint, resolved);

        TcpStream::connect(resolved).await.map_err(anyhow::Error::from)
    };

    // Establish TCP connection with the endpoint.
    debug!("TCP connection establishment with the endpoint {}: ... ", endpoint);
    let mut tcp_stream = match timeout(connect_timeout, connect).await {
        Ok(Ok(tcp_stream)) => tcp_stream,
        Ok(Err(err)) => {
            debug!("TCP connection establishment with the endpoint {}: FAILED with '{}'", endpoint, err);
            let kind = match err.downcast_ref::<std::io::Error>() {
                Some(io) => io.kind(),
                None => std::io::ErrorKind::Other,
            };
            bail!(Socks5Error::ConnectFailed(kind))
        }
        Err(_) => {
            debug!("TCP connection establishment with the endpoint {}: TIMEOUT", endpoint);
            bail!(Socks5Error::ConnectTimeout(connect_timeout))
        }
    };
    debug!("TCP connection establishment with the endpoint {}: SUCCESS", endpoint);

    // Apply passed options to created TCP stream.
    tcp_opts.apply_to(&mut tcp_stream)?;

    Ok(tcp_stream)
}
