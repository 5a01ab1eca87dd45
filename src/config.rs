use clap::Parser;
use std::time::Duration;

pub const LOG4RS_CONFIG_FILE_PATH: &str = "log4rs.yaml";

#[derive(Default, Parser, Debug)]
#[clap(about = "Connect to destination through SOCKS5 proxy", version)]
pub struct Socks5WrapConfig {
    /// SOCKS5 proxy host, IPv4 / IPv6 literal or domain name
    #[clap(long, env = "PROXY_IP")]
    proxy_host: String,

    /// SOCKS5 proxy port
    #[clap(long, env = "PROXY_PORT", default_value_t = 1080)]
    proxy_port: u16,

    /// Destination host, IPv4 / IPv6 literal or domain name
    #[clap(long, env = "DEST_IP")]
    dest_host: String,

    /// Destination port
    #[clap(long, env = "DEST_PORT")]
    dest_port: u16,

    /// Limit for TCP connection establishment with proxy
    #[clap(short = 't', long, default_value_t = 60)]
    connect_timeout_secs: u64,

    /// Seconds of idleness before TCP keepalive probes are sent to proxy
    #[clap(short = 'k', long)]
    keepalive_secs: Option<u64>,
}

impl Socks5WrapConfig {
    pub fn proxy_host(&self) -> &str {
        &self.proxy_host
    }

    pub fn proxy_port(&self) -> u16 {
        self.proxy_port
    }

    pub fn dest_host(&self) -> &str {
        &self.dest_host
    }

    pub fn dest_port(&self) -> u16 {
        self.dest_port
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn keepalive(&self) -> Option<Duration> {
        self.keepalive_secs.map(Duration::from_secs)
    }
}
