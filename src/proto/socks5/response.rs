use super::{consts, AuthMethod, ReplyStatus};
use crate::{
    common::error::{InvalidReply, InvalidValue, Socks5Error},
    io::Socks5Response,
};
use anyhow::{bail, ensure, Result};
use std::io;
use tokio::io::AsyncReadExt;

// The server selects from one of the methods given in METHODS, and
// sends a METHOD selection message:
// +----+--------+
// |VER | METHOD |
// +----+--------+
// | 1  |   1    |
// +----+--------+

#[derive(Debug, PartialEq)]
pub struct HandshakeResponse {
    method: AuthMethod,
}

impl HandshakeResponse {
    pub fn method(&self) -> AuthMethod {
        self.method
    }
}

impl Socks5Response for HandshakeResponse {
    async fn read_from<T: AsyncReadExt + Unpin>(stream: &mut T) -> Result<Self> {
        let mut response: [u8; 2] = [0, 0];
        if let Err(err) = stream.read_exact(&mut response).await {
            match err.kind() {
                io::ErrorKind::UnexpectedEof => bail!(Socks5Error::MethodReplyInvalidLength),
                _ => bail!(err),
            }
        }

        let (version, method) = (response[0], response[1]);

        // Bail out if version is not supported.
        ensure!(
            version == consts::SOCKS5_VERSION,
            Socks5Error::DataError(InvalidValue::ProtocolVersion(version))
        );

        Ok(HandshakeResponse {
            method: AuthMethod::from_socks5_const(method)?,
        })
    }
}

// The server evaluates the relay request, and returns a reply formed as follows:
// +----+-----+-------+------+----------+----------+
// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
// +----+-----+-------+------+----------+----------+
// | 1  |  1  | X'00' |  1   | Variable |    2     |
// +----+-----+-------+------+----------+----------+

const RELAY_RESPONSE_HEADER_LEN: usize = 4;

/// Fixed part of the relay reply. BND.ADDR and BND.PORT are left in the stream
/// until ```skip_bound_address``` drains them.
///
/// A header cut short by EOF is still returned, so that the reply code can be
/// inspected when at least two bytes made it through.
#[derive(Debug, PartialEq)]
pub struct RelayResponse {
    header: [u8; RELAY_RESPONSE_HEADER_LEN],
    received: usize,
}

impl RelayResponse {
    pub fn status(&self) -> Option<ReplyStatus> {
        (self.received >= 2).then(|| ReplyStatus::from(self.header[1]))
    }

    pub fn is_complete(&self) -> bool {
        self.received == RELAY_RESPONSE_HEADER_LEN
    }

    /// Checks framing of the header: full length and protocol version.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.is_complete(), Socks5Error::ReplyInvalidLength);

        let version = self.header[0];
        ensure!(
            version == consts::SOCKS5_VERSION,
            Socks5Error::DataError(InvalidValue::ProtocolVersion(version))
        );

        Ok(())
    }

    /// Reads and discards bound address and port.
    /// Returns the number of consumed bytes.
    pub async fn skip_bound_address<T: AsyncReadExt + Unpin>(&self, stream: &mut T) -> Result<usize> {
        use consts::address::*;
        debug_assert!(self.is_complete(), "header should be complete");

        let address_type = self.header[3];
        let trailer_len = match address_type {
            SOCKS5_ADDR_TYPE_IPV4 => 4 + 2,
            SOCKS5_ADDR_TYPE_IPV6 => 16 + 2,
            SOCKS5_ADDR_TYPE_DOMAIN_NAME => {
                let len = read_trailer(stream, 1).await?[0];
                // Length byte counts as consumed too.
                return Ok(1 + read_trailer(stream, len as usize + 2).await?.len());
            }
            _ => bail!(Socks5Error::ReplyInvalid(InvalidReply::AddressType(address_type))),
        };

        Ok(read_trailer(stream, trailer_len).await?.len())
    }
}

impl Socks5Response for RelayResponse {
    async fn read_from<T: AsyncReadExt + Unpin>(stream: &mut T) -> Result<Self> {
        let mut header = [0u8; RELAY_RESPONSE_HEADER_LEN];
        let mut received = 0;

        // Unlike read_exact, keep whatever arrived before EOF.
        while received < RELAY_RESPONSE_HEADER_LEN {
            match stream.read(&mut header[received..]).await? {
                0 => break,
                n => received += n,
            }
        }

        Ok(RelayResponse { header, received })
    }
}

async fn read_trailer<T: AsyncReadExt + Unpin>(stream: &mut T, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    if let Err(err) = stream.read_exact(&mut buf).await {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => bail!(Socks5Error::ReplyInvalid(InvalidReply::TruncatedBoundAddress)),
            _ => bail!(err),
        }
    }
    Ok(buf)
}
