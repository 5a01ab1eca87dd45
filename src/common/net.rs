use crate::common::error::{InvalidValue, Socks5Error};
use anyhow::{bail, Result};
use std::{
    fmt::Display,
    io,
    net::{IpAddr, SocketAddr},
};
use tokio::net::lookup_host;

pub mod tcp;

macro_rules! ipv4_socket_address {
    ($ipv4:expr, $port:expr) => {
        Address::SocketAddress(std::net::SocketAddr::V4(std::net::SocketAddrV4::new($ipv4, $port)))
    };
}

macro_rules! ipv6_socket_address {
    ($ipv6:expr, $port:expr) => {
        Address::SocketAddress(std::net::SocketAddr::V6(std::net::SocketAddrV6::new($ipv6, $port, 0, 0)))
    };
}

#[allow(unused_imports)]
pub(crate) use ipv4_socket_address;
#[allow(unused_imports)]
pub(crate) use ipv6_socket_address;

/// Network endpoint, either proxy or destination.
///
/// The address family is fixed when the value is constructed: a `SocketAddress`
/// keeps its IPv4 / IPv6 variant, anything that does not parse as an IP literal
/// is a `DomainName`.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Address {
    SocketAddress(SocketAddr),
    DomainName(String, u16),
}

impl Address {
    /// Builds an address from a caller-supplied host and port.
    pub fn parse(host: &str, port: u16) -> Result<Address, Socks5Error> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(Address::SocketAddress(SocketAddr::new(ip, port)));
        }
        // Bracketed IPv6 literal, e.g. "[::1]".
        if let Some(ip) = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .and_then(|h| h.parse::<IpAddr>().ok())
        {
            return Ok(Address::SocketAddress(SocketAddr::new(ip, port)));
        }
        Address::domain_name(host, port)
    }

    pub fn domain_name(name: &str, port: u16) -> Result<Address, Socks5Error> {
        if !name.is_ascii() {
            return Err(Socks5Error::DataError(InvalidValue::DomainNameEncoding(name.to_string())));
        }
        if name.is_empty() || name.len() > u8::MAX as usize {
            return Err(Socks5Error::DataError(InvalidValue::DomainNameLength(name.len())));
        }
        Ok(Address::DomainName(name.to_string(), port))
    }

    pub async fn to_socket_addr(&self) -> Result<SocketAddr> {
        match self {
            Address::SocketAddress(sock_addr) => Ok(*sock_addr),
            Address::DomainName(hostname, port) => {
                // Resolve by means of builtin tokio DNS resolver
                let mut resolved_names = lookup_host((hostname.as_str(), *port)).await?;
                // Take first found
                match resolved_names.next() {
                    Some(addr) => Ok(addr),
                    None => bail!(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("unable to resolve domain name {hostname}")
                    )),
                }
            }
        }
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Address::SocketAddress(addr)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::SocketAddress(sock) => write!(f, "{sock:}"),
            Address::DomainName(name, port) => write!(f, "{name:}:{port:}"),
        }
    }
}
