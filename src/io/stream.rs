use super::{Socks5Request, Socks5RequestWrite, Socks5Response, Socks5ResponseRead};
use anyhow::Result;
use log::trace;
use std::{
    fmt::Debug,
    ops::{Deref, DerefMut},
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Stream wrapper implementation

pub struct Socks5Stream<T> {
    stream: T,
}

impl<T> Socks5Stream<T>
where
    T: AsyncReadExt + AsyncWriteExt + Unpin,
{
    pub fn new(stream: T) -> Socks5Stream<T> {
        Socks5Stream { stream }
    }

    /// Releases the underlying stream, e.g. once the handshake is over.
    pub fn into_inner(self) -> T {
        self.stream
    }
}

impl<T> Socks5RequestWrite for Socks5Stream<T>
where
    T: AsyncReadExt + AsyncWriteExt + Unpin,
{
    async fn write_request<Request>(&mut self, request: Request) -> Result<()>
    where
        Request: Socks5Request + Debug,
    {
        Request::write_to(&request, &mut self.stream).await?;
        trace!("Write {:?}", request);

        Ok(())
    }
}

impl<T> Socks5ResponseRead for Socks5Stream<T>
where
    T: AsyncReadExt + AsyncWriteExt + Unpin,
{
    async fn read_response<Response>(&mut self) -> Result<Response>
    where
        Response: Socks5Response + Debug,
    {
        let response = Response::read_from(&mut self.stream).await?;
        trace!("Read {:?}", response);

        Ok(response)
    }
}

impl<T> Deref for Socks5Stream<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.stream
    }
}

impl<T> DerefMut for Socks5Stream<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stream
    }
}
