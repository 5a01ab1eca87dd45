use anyhow::Result;
use clap::Parser;
use log::info;
use log4rs::config::Deserializers;
use socket2::TcpKeepalive;
use socks5wrap::{
    config::{self, Socks5WrapConfig},
    Address, ProxySession,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    log4rs::init_file(config::LOG4RS_CONFIG_FILE_PATH, Deserializers::default())?;
    // Parse config
    let config = Socks5WrapConfig::parse();

    let proxy = Address::parse(config.proxy_host(), config.proxy_port())?;
    let destination = Address::parse(config.dest_host(), config.dest_port())?;

    // Create session
    let mut builder = ProxySession::builder(proxy, destination);
    builder.with_connect_timeout(config.connect_timeout());
    if let Some(idle) = config.keepalive() {
        builder.with_keepalive(TcpKeepalive::new().with_time(idle));
    }
    let mut session = builder.build();

    // Handshake, then release the tunnel
    let stream = session.connect().await?;
    info!("Result Ok, local address {}", stream.local_addr()?);

    Ok(())
}
