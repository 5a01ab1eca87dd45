use super::AsyncListener;
use anyhow::{bail, Result};
use log::{debug, error};
use std::{
    future::Future,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    io::{copy_bidirectional, AsyncReadExt, AsyncWriteExt},
    net::{lookup_host, TcpListener, TcpStream},
    time::{sleep, Instant},
};

/*
 * Minimal scripted SOCKS5 proxy
 */

/// Bound address the proxy reports in a successful reply.
#[derive(Debug, Clone)]
pub enum BoundAddress {
    Ipv4,
    Ipv6,
    DomainName(String),
}

impl BoundAddress {
    fn reply_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0x05, 0x00, 0x00];
        match self {
            BoundAddress::Ipv4 => {
                bytes.push(0x01);
                bytes.extend_from_slice(&Ipv4Addr::new(10, 0, 0, 1).octets());
            }
            BoundAddress::Ipv6 => {
                bytes.push(0x04);
                bytes.extend_from_slice(&Ipv6Addr::LOCALHOST.octets());
            }
            BoundAddress::DomainName(name) => {
                bytes.push(0x03);
                bytes.push(name.len() as u8);
                bytes.extend_from_slice(name.as_bytes());
            }
        }
        bytes.extend_from_slice(&1080u16.to_be_bytes());
        bytes
    }
}

#[derive(Debug, Clone)]
pub enum ProxyBehaviour {
    /// Select "no authentication", connect to the requested destination and relay data.
    Relay(BoundAddress),
    /// Answer method selection with X'FF'.
    RejectMethods,
    /// Select "no authentication", then answer CONNECT with the passed reply code.
    Reply(u8),
}

/// Destination decoded from CONNECT request by the proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    SocketAddress(SocketAddr),
    DomainName(String, u16),
}

/// What the proxy has observed from its clients.
#[derive(Debug, Clone, Default)]
pub struct ProxyJournal {
    connect_requests: Arc<Mutex<Vec<(Vec<u8>, Destination)>>>,
    leftovers: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ProxyJournal {
    /// Raw CONNECT requests along with decoded destinations.
    pub fn connect_requests(&self) -> Vec<(Vec<u8>, Destination)> {
        self.connect_requests.lock().unwrap().clone()
    }

    /// Bytes sent by clients after the proxy's final answer, one entry per closed connection.
    /// Waits until ```count``` connections have been closed by clients.
    pub async fn leftovers(&self, count: usize) -> Vec<Vec<u8>> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let leftovers = self.leftovers.lock().unwrap().clone();
            if leftovers.len() >= count || Instant::now() > deadline {
                return leftovers;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

pub struct MockSocks5Proxy {
    inner: TcpListener,
    behaviour: ProxyBehaviour,
    journal: ProxyJournal,
}

impl MockSocks5Proxy {
    /// Binds to an ephemeral loopback port.
    pub async fn bind(behaviour: ProxyBehaviour) -> MockSocks5Proxy {
        let inner = TcpListener::bind("127.0.0.1:0").await.unwrap();
        debug!("[MockSocks5Proxy] Bound to {} with {behaviour:?}", inner.local_addr().unwrap());
        MockSocks5Proxy {
            inner,
            behaviour,
            journal: ProxyJournal::default(),
        }
    }

    pub fn journal(&self) -> ProxyJournal {
        self.journal.clone()
    }
}

impl AsyncListener for MockSocks5Proxy {
    fn listen(&mut self) -> impl Future<Output = Result<()>> + Send {
        serve(&self.inner, &self.behaviour, &self.journal)
    }

    fn name(&self) -> &'static str {
        "Mock SOCKS5 proxy"
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr().unwrap()
    }
}

async fn serve(listener: &TcpListener, behaviour: &ProxyBehaviour, journal: &ProxyJournal) -> Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!("[MockSocks5Proxy] Accepted connection from {addr:}");

        let (behaviour, journal) = (behaviour.clone(), journal.clone());
        tokio::spawn(async move {
            if let Err(err) = handle_client(stream, behaviour, journal).await {
                error!("[MockSocks5Proxy] Client {addr} has been handled with error: {err}");
            }
        });
    }
}

async fn handle_client(mut stream: TcpStream, behaviour: ProxyBehaviour, journal: ProxyJournal) -> Result<()> {
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await?;
    let mut methods = vec![0u8; header[1] as usize];
    stream.read_exact(&mut methods).await?;

    if let ProxyBehaviour::RejectMethods = behaviour {
        stream.write_all(&[0x05, 0xff]).await?;
        return record_leftovers(stream, &journal).await;
    }

    stream.write_all(&[0x05, 0x00]).await?;

    let (raw, destination) = read_connect_request(&mut stream).await?;
    journal.connect_requests.lock().unwrap().push((raw, destination.clone()));

    match behaviour {
        ProxyBehaviour::Reply(rep) => {
            stream.write_all(&[0x05, rep, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await?;
            record_leftovers(stream, &journal).await
        }
        ProxyBehaviour::Relay(bound) => {
            let mut outbound = connect_to(&destination).await?;
            stream.write_all(&bound.reply_bytes()).await?;
            copy_bidirectional(&mut stream, &mut outbound).await?;
            Ok(())
        }
        ProxyBehaviour::RejectMethods => unreachable!(),
    }
}

async fn read_connect_request(stream: &mut TcpStream) -> Result<(Vec<u8>, Destination)> {
    let mut raw = vec![0u8; 4];
    stream.read_exact(&mut raw).await?;

    let destination = match raw[3] {
        0x01 => {
            let mut body = [0u8; 6];
            stream.read_exact(&mut body).await?;
            raw.extend_from_slice(&body);
            let ip = Ipv4Addr::new(body[0], body[1], body[2], body[3]);
            Destination::SocketAddress(SocketAddr::new(ip.into(), u16::from_be_bytes([body[4], body[5]])))
        }
        0x04 => {
            let mut body = [0u8; 18];
            stream.read_exact(&mut body).await?;
            raw.extend_from_slice(&body);
            let octets: [u8; 16] = body[..16].try_into()?;
            let port = u16::from_be_bytes([body[16], body[17]]);
            Destination::SocketAddress(SocketAddr::new(Ipv6Addr::from(octets).into(), port))
        }
        0x03 => {
            let len = stream.read_u8().await?;
            let mut body = vec![0u8; len as usize + 2];
            stream.read_exact(&mut body).await?;
            raw.push(len);
            raw.extend_from_slice(&body);
            let name = String::from_utf8(body[..len as usize].to_vec())?;
            let port = u16::from_be_bytes([body[len as usize], body[len as usize + 1]]);
            Destination::DomainName(name, port)
        }
        other => bail!("unknown address type {other:#04x}"),
    };

    Ok((raw, destination))
}

async fn connect_to(destination: &Destination) -> Result<TcpStream> {
    match destination {
        Destination::SocketAddress(addr) => Ok(TcpStream::connect(addr).await?),
        Destination::DomainName(name, port) => {
            for addr in lookup_host((name.as_str(), *port)).await? {
                if let Ok(stream) = TcpStream::connect(addr).await {
                    return Ok(stream);
                }
            }
            bail!("unable to connect to {name}:{port}")
        }
    }
}

async fn record_leftovers(mut stream: TcpStream, journal: &ProxyJournal) -> Result<()> {
    let mut leftovers = Vec::new();
    // Reset by the client counts as close as well.
    let _ = stream.read_to_end(&mut leftovers).await;
    journal.leftovers.lock().unwrap().push(leftovers);
    Ok(())
}
