use crate::proto::socks5::{AuthMethod, ReplyStatus};
use std::{io, time::Duration};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Socks5Error {
    #[error("connection with proxy is not established within {0:?}")]
    ConnectTimeout(Duration),
    #[error("unable to establish connection with proxy: {0}")]
    ConnectFailed(io::ErrorKind),
    #[error("method selection reply has invalid length")]
    MethodReplyInvalidLength,
    #[error("proxy has not accepted any of offered authentication methods")]
    MethodNotAcceptable,
    #[error("{0} is not supported")]
    Unsupported(Unsupported),
    #[error("relay reply header has invalid length")]
    ReplyInvalidLength,
    #[error("relay reply is invalid: {0}")]
    ReplyInvalid(InvalidReply),
    #[error("data has incorrect / corrupted field: {0}")]
    DataError(InvalidValue),
    #[error("transport failure during handshake: {0}")]
    Transport(io::ErrorKind),
    #[error("precondition violated: {0}")]
    Precondition(Precondition),
}

impl Socks5Error {
    /// Maps an error propagated through `anyhow` back to the typed error.
    /// Raw I/O errors that escaped the handshake steps become `Transport`.
    pub fn from_anyhow(err: anyhow::Error) -> Socks5Error {
        let err = match err.downcast::<Socks5Error>() {
            Ok(socks5_err) => return socks5_err,
            Err(err) => err,
        };
        match err.downcast::<io::Error>() {
            Ok(io) => Socks5Error::Transport(io.kind()),
            Err(_) => Socks5Error::Transport(io::ErrorKind::Other),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidValue {
    #[error("invalid version of protocol {0:#04x}")]
    ProtocolVersion(u8),
    #[error("domain name of {0} bytes, expected 1 to 255")]
    DomainNameLength(usize),
    #[error("domain name '{0}' contains non-ASCII characters")]
    DomainNameEncoding(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum Unsupported {
    #[error("{0:?} authentication method")]
    AuthMethod(AuthMethod),
    #[error("authentication method {0:#04x}")]
    AuthMethodValue(u8),
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidReply {
    #[error("proxy replied with {0:?}")]
    Status(ReplyStatus),
    #[error("bound address is truncated")]
    TruncatedBoundAddress,
    #[error("invalid type of bound address {0:#04x}")]
    AddressType(u8),
}

#[derive(Error, Debug, PartialEq)]
pub enum Precondition {
    #[error("session has already been used for connection attempt")]
    SessionAlreadyUsed,
    #[error("authentication method has not been negotiated")]
    AuthMethodNotNegotiated,
}
