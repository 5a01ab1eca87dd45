//!
//! Socks5 protocol implementation details
//!
//! RFC 1928
//! https://datatracker.ietf.org/doc/html/rfc1928#ref-1
//!
use crate::common::{
    error::{Socks5Error, Unsupported},
    net::Address,
};
use anyhow::{bail, Result};
use bytes::BufMut;
use std::net::{SocketAddr, SocketAddrV4, SocketAddrV6};

pub mod request;
pub mod response;


#[rustfmt::skip]
pub(crate) mod consts {
    pub const SOCKS5_VERSION: u8 = 0x05;
    pub const SOCKS5_RESERVED: u8 = 0x00;

    pub mod auth {
        pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
        pub const SOCKS5_AUTH_METHOD_GSSAPI: u8 = 0x01;
        pub const SOCKS5_AUTH_METHOD_PASSWORD: u8 = 0x02;
        pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xff;
    }

    pub mod command {
        pub const SOCKS5_CMD_CONNECT: u8 = 0x01;
    }

    pub mod address {
        pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
        pub const SOCKS5_ADDR_TYPE_DOMAIN_NAME: u8 = 0x03;
        pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;
    }

    pub mod reply {
        pub const SOCKS5_REPLY_SUCCEEDED: u8 = 0x00;
        pub const SOCKS5_REPLY_GENERAL_FAILURE: u8 = 0x01;
        pub const SOCKS5_REPLY_CONNECTION_NOT_ALLOWED: u8 = 0x02;
        pub const SOCKS5_REPLY_NETWORK_UNREACHABLE: u8 = 0x03;
        pub const SOCKS5_REPLY_HOST_UNREACHABLE: u8 = 0x04;
        pub const SOCKS5_REPLY_CONNECTION_REFUSED: u8 = 0x05;
        pub const SOCKS5_REPLY_TTL_EXPIRED: u8 = 0x06;
        pub const SOCKS5_REPLY_COMMAND_NOT_SUPPORTED: u8 = 0x07;
        pub const SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED: u8 = 0x08;
    }
}

#[rustfmt::skip]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AuthMethod {
    None,
    GssAPI,
    Password,
    NoAcceptable,
}

impl AuthMethod {
    pub fn from_socks5_const(value: u8) -> Result<AuthMethod> {
        use consts::auth::*;
        match value {
            SOCKS5_AUTH_METHOD_NONE => Ok(AuthMethod::None),
            SOCKS5_AUTH_METHOD_GSSAPI => Ok(AuthMethod::GssAPI),
            SOCKS5_AUTH_METHOD_PASSWORD => Ok(AuthMethod::Password),
            SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE => Ok(AuthMethod::NoAcceptable),
            _ => bail!(Socks5Error::Unsupported(Unsupported::AuthMethodValue(value))),
        }
    }

    #[rustfmt::skip]
    pub fn as_u8(self) -> u8 {
        match self {
            AuthMethod::None         => consts::auth::SOCKS5_AUTH_METHOD_NONE,
            AuthMethod::GssAPI       => consts::auth::SOCKS5_AUTH_METHOD_GSSAPI,
            AuthMethod::Password     => consts::auth::SOCKS5_AUTH_METHOD_PASSWORD,
            AuthMethod::NoAcceptable => consts::auth::SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
}

impl Command {
    pub fn as_u8(self) -> u8 {
        match self {
            Command::Connect => consts::command::SOCKS5_CMD_CONNECT,
        }
    }
}

impl Address {
    /// Writes ATYP, address and port. The address type follows the variant only.
    pub fn write_to<T: BufMut>(&self, buf: &mut T) {
        match self {
            Address::SocketAddress(SocketAddr::V4(ipv4_addr)) => Address::write_ipv4(buf, ipv4_addr),
            Address::SocketAddress(SocketAddr::V6(ipv6_addr)) => Address::write_ipv6(buf, ipv6_addr),
            Address::DomainName(name, port) => Address::write_domain_name(buf, name, *port),
        }
    }

    /// Number of bytes ```write_to``` produces.
    pub fn encoded_len(&self) -> usize {
        match self {
            Address::SocketAddress(SocketAddr::V4(_)) => 1 + 4 + 2,
            Address::SocketAddress(SocketAddr::V6(_)) => 1 + 16 + 2,
            Address::DomainName(name, _) => 1 + 1 + name.len() + 2,
        }
    }

    fn write_ipv4<T: BufMut>(bytes: &mut T, ipv4_addr: &SocketAddrV4) {
        bytes.put_u8(consts::address::SOCKS5_ADDR_TYPE_IPV4);
        bytes.put_slice(&ipv4_addr.ip().octets());
        bytes.put_u16(ipv4_addr.port());
    }

    fn write_ipv6<T: BufMut>(bytes: &mut T, ipv6_addr: &SocketAddrV6) {
        bytes.put_u8(consts::address::SOCKS5_ADDR_TYPE_IPV6);
        bytes.put_slice(&ipv6_addr.ip().octets());
        bytes.put_u16(ipv6_addr.port());
    }

    fn write_domain_name<T: BufMut>(bytes: &mut T, name: &str, port: u16) {
        // Length is checked on construction, see Address::domain_name.
        debug_assert!(!name.is_empty() && name.len() <= u8::MAX as usize);
        bytes.put_u8(consts::address::SOCKS5_ADDR_TYPE_DOMAIN_NAME);
        bytes.put_u8(name.len() as u8);
        bytes.put_slice(name.as_bytes());
        bytes.put_u16(port);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Succeeded,
    GeneralFailure,
    ConnectionNotAllowed,
    NetworkUnreachable,
    HostUnreachable,
    ConnectionRefused,
    TtlExpired,
    CommandNotSupported,
    AddressTypeNotSupported,
    OtherReply(u8),
}

impl ReplyStatus {
    #[rustfmt::skip]
    pub fn as_u8(self) -> u8 {
        match self {
            ReplyStatus::Succeeded               => consts::reply::SOCKS5_REPLY_SUCCEEDED,
            ReplyStatus::GeneralFailure          => consts::reply::SOCKS5_REPLY_GENERAL_FAILURE,
            ReplyStatus::ConnectionNotAllowed    => consts::reply::SOCKS5_REPLY_CONNECTION_NOT_ALLOWED,
            ReplyStatus::NetworkUnreachable      => consts::reply::SOCKS5_REPLY_NETWORK_UNREACHABLE,
            ReplyStatus::HostUnreachable         => consts::reply::SOCKS5_REPLY_HOST_UNREACHABLE,
            ReplyStatus::ConnectionRefused       => consts::reply::SOCKS5_REPLY_CONNECTION_REFUSED,
            ReplyStatus::TtlExpired              => consts::reply::SOCKS5_REPLY_TTL_EXPIRED,
            ReplyStatus::CommandNotSupported     => consts::reply::SOCKS5_REPLY_COMMAND_NOT_SUPPORTED,
            ReplyStatus::AddressTypeNotSupported => consts::reply::SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED,
            ReplyStatus::OtherReply(other)       => other,
        }
    }
}

impl From<u8> for ReplyStatus {
    #[rustfmt::skip]
    fn from(value: u8) -> Self {
        use consts::reply::*;
        match value {
            SOCKS5_REPLY_SUCCEEDED                  => ReplyStatus::Succeeded,
            SOCKS5_REPLY_GENERAL_FAILURE            => ReplyStatus::GeneralFailure,
            SOCKS5_REPLY_CONNECTION_NOT_ALLOWED     => ReplyStatus::ConnectionNotAllowed,
            SOCKS5_REPLY_NETWORK_UNREACHABLE        => ReplyStatus::NetworkUnreachable,
            SOCKS5_REPLY_HOST_UNREACHABLE           => ReplyStatus::HostUnreachable,
            SOCKS5_REPLY_CONNECTION_REFUSED         => ReplyStatus::ConnectionRefused,
            SOCKS5_REPLY_TTL_EXPIRED                => ReplyStatus::TtlExpired,
            SOCKS5_REPLY_COMMAND_NOT_SUPPORTED      => ReplyStatus::CommandNotSupported,
            SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED => ReplyStatus::AddressTypeNotSupported,
            other                                   => ReplyStatus::OtherReply(other),
        }
    }
}
