use super::{consts, AuthMethod, Command};
use crate::{common::net::Address, io::Socks5Request};
use anyhow::Result;
use bytes::{BufMut, BytesMut};
use cfg_if::cfg_if;
use tokio::io::AsyncWriteExt;

// The client connects to the server, and sends a
// version identifier/method selection message:
// +----+----------+----------+
// |VER | NMETHODS | METHODS  |
// +----+----------+----------+
// | 1  |    1     | 1 to 255 |
// +----+----------+----------+

#[derive(Debug)]
pub struct HandshakeRequest {
    auth_methods: Vec<AuthMethod>,
}

impl HandshakeRequest {
    /// Offers methods in the passed order. Duplicates are written as is.
    pub fn new(auth_methods: Vec<AuthMethod>) -> HandshakeRequest {
        debug_assert!(
            !auth_methods.is_empty() && auth_methods.len() <= u8::MAX as usize,
            "expected 1 to 255 methods"
        );
        debug_assert!(!auth_methods.contains(&AuthMethod::NoAcceptable), "not a method to offer");
        HandshakeRequest { auth_methods }
    }

    fn to_bytes(&self) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(2 + self.auth_methods.len());
        bytes.put_u8(consts::SOCKS5_VERSION);
        bytes.put_u8(self.auth_methods.len() as u8);
        self.auth_methods.iter().for_each(|m| bytes.put_u8(m.as_u8()));
        bytes
    }
}

impl Socks5Request for HandshakeRequest {
    async fn write_to<T: AsyncWriteExt + Unpin>(&self, stream: &mut T) -> Result<()> {
        stream.write_all(&self.to_bytes()).await?;
        Ok(())
    }
}

// The SOCKS request information is sent by the client as
// soon as it has established a connection to the SOCKS
// server, and completed the authentication negotiations.
// +----+-----+-------+------+----------+----------+
// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
// +----+-----+-------+------+----------+----------+
// | 1  |  1  | X'00' |  1   | Variable |    2     |
// +----+-----+-------+------+----------+----------+

#[derive(Debug)]
pub struct RelayRequest {
    command: Command,
    target_addr: Address,
}

impl RelayRequest {
    pub fn connect(target_addr: Address) -> RelayRequest {
        RelayRequest {
            command: Command::Connect,
            target_addr,
        }
    }

    cfg_if! {
        if #[cfg(test)] {
            pub fn command(&self) -> Command {
                self.command
            }

            pub fn target_addr(&self) -> &Address {
                &self.target_addr
            }
        }
    }

    pub fn to_bytes(&self) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(3 + self.target_addr.encoded_len());
        bytes.put_slice(&[consts::SOCKS5_VERSION, self.command.as_u8(), consts::SOCKS5_RESERVED]);
        self.target_addr.write_to(&mut bytes);
        bytes
    }
}

impl Socks5Request for RelayRequest {
    async fn write_to<T: AsyncWriteExt + Unpin>(&self, stream: &mut T) -> Result<()> {
        stream.write_all(&self.to_bytes()).await?;
        Ok(())
    }
}
