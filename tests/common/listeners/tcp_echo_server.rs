use super::AsyncListener;
use anyhow::Result;
use log::{debug, error};
use std::{future::Future, net::SocketAddr};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/*
 * TCP Echo server listener
 */
pub struct TcpEchoServer {
    inner: TcpListener,
}

impl TcpEchoServer {
    /// Binds to an ephemeral loopback port.
    pub async fn bind() -> TcpEchoServer {
        let inner = TcpListener::bind("127.0.0.1:0").await.unwrap();
        debug!("[TcpEchoServerListener] Bound TCP echo server to {}", inner.local_addr().unwrap());
        TcpEchoServer { inner }
    }
}

async fn serve(listener: &TcpListener) -> Result<()> {
    loop {
        let (mut stream, addr) = listener.accept().await?;
        debug!("[TcpEchoServerListener] Accepted connection from {addr:}");

        tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            loop {
                match stream.read(&mut buf).await {
                    Ok(0) => {
                        debug!("[TcpEchoServerListener] Received EOF from {addr}");
                        break;
                    }
                    Ok(n) => {
                        if let Err(err) = stream.write_all(&buf[..n]).await {
                            error!("[TcpEchoServerListener] Failed to echo to {addr}: {err}");
                            break;
                        }
                    }
                    Err(err) => {
                        error!("[TcpEchoServerListener] Failed to read from {addr}: {err}");
                        break;
                    }
                }
            }
        });
    }
}

impl AsyncListener for TcpEchoServer {
    fn listen(&mut self) -> impl Future<Output = Result<()>> + Send {
        serve(&self.inner)
    }

    fn name(&self) -> &'static str {
        "TCP echo server"
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr().unwrap()
    }
}
