use anyhow::Result;
use std::fmt::Debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub mod stream;

/// Message sent by the client to SOCKS5 proxy.
pub trait Socks5Request {
    async fn write_to<T: AsyncWriteExt + Unpin>(&self, stream: &mut T) -> Result<()>;
}

/// Message received by the client from SOCKS5 proxy.
pub trait Socks5Response {
    async fn read_from<T: AsyncReadExt + Unpin>(stream: &mut T) -> Result<Self>
    where
        Self: std::marker::Sized;
}

pub trait Socks5RequestWrite {
    async fn write_request<Request>(&mut self, request: Request) -> Result<()>
    where
        Request: Socks5Request + Debug;
}

pub trait Socks5ResponseRead {
    async fn read_response<Response>(&mut self) -> Result<Response>
    where
        Response: Socks5Response + Debug;
}
