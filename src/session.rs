use crate::{
    auth::Socks5Authenticator,
    common::{
        error::{InvalidReply, Precondition, Socks5Error},
        logging,
        net::{
            tcp::{self, TcpConnectionOptions},
            Address,
        },
    },
    io::{stream::Socks5Stream, Socks5RequestWrite, Socks5ResponseRead},
    proto::socks5::{
        request::{HandshakeRequest, RelayRequest},
        response::{HandshakeResponse, RelayResponse},
        AuthMethod, ReplyStatus,
    },
};
use anyhow::{bail, Result};
use log::{debug, error, info};
use socket2::TcpKeepalive;
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

/// Single SOCKS5 CONNECT attempt through a proxy.
///
/// The session runs the handshake exactly once. On success the stream is handed over
/// to the caller and carries raw application data to the destination. On failure the
/// stream is dropped, and thereby closed, before the error is returned.
///
/// Dropping an in-flight ```connect``` future closes the stream as well; the session
/// then stays ```InProgress``` and refuses to be reused.
#[derive(Debug)]
pub struct ProxySession {
    proxy: Address,
    destination: Address,
    connect_timeout: Duration,
    tcp_opts: TcpConnectionOptions,
    state: SessionState,
    auth_method: Option<AuthMethod>,
    reply: Option<ReplyStatus>,
    reply_len: Option<usize>,
}

impl ProxySession {
    pub fn new(proxy: Address, destination: Address) -> ProxySession {
        ProxySession::builder(proxy, destination).build()
    }

    pub fn builder(proxy: Address, destination: Address) -> ProxySessionBuilder {
        ProxySessionBuilder {
            proxy,
            destination,
            connect_timeout: None,
            keep_alive: None,
        }
    }

    pub fn proxy(&self) -> &Address {
        &self.proxy
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Method selected by the proxy, if negotiation got that far.
    pub fn auth_method(&self) -> Option<AuthMethod> {
        self.auth_method
    }

    /// Reply code of the relay response, if it has been received.
    pub fn reply(&self) -> Option<ReplyStatus> {
        self.reply
    }

    /// Total length of the relay response consumed from the stream.
    pub fn reply_len(&self) -> Option<usize> {
        self.reply_len
    }

    /// Connects to the proxy and establishes the tunnel to the destination.
    pub async fn connect(&mut self) -> Result<TcpStream, Socks5Error> {
        self.start()?;
        let result = self.connect_and_handshake().await;
        self.complete(result)
    }

    /// Runs the handshake over an already connected ```stream```.
    pub async fn connect_over<S>(&mut self, stream: S) -> Result<S, Socks5Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.start()?;
        let result = self.handshake(stream).await;
        self.complete(result)
    }

    fn start(&mut self) -> Result<(), Socks5Error> {
        if self.state != SessionState::NotStarted {
            return Err(Socks5Error::Precondition(Precondition::SessionAlreadyUsed));
        }
        self.state = SessionState::InProgress;
        Ok(())
    }

    fn complete<S>(&mut self, result: Result<S>) -> Result<S, Socks5Error> {
        self.state = SessionState::Completed;
        match result {
            Ok(stream) => {
                logging::log_session_established!(self.proxy, self.destination, self.reply_len.unwrap_or_default());
                Ok(stream)
            }
            Err(err) => {
                let err = Socks5Error::from_anyhow(err);
                logging::log_session_failed!(self.proxy, self.destination, err, self.reply);
                Err(err)
            }
        }
    }

    async fn connect_and_handshake(&mut self) -> Result<TcpStream> {
        let stream =
            tcp::establish_tcp_connection_with_timeout(&self.proxy, self.connect_timeout, &self.tcp_opts).await?;

        self.handshake(stream).await
    }

    /// Method negotiation, authentication and relay request, strictly in this order.
    /// The first failing step drops the stream.
    async fn handshake<S>(&mut self, stream: S) -> Result<S>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = Socks5Stream::new(stream);
        let mut authenticator = Socks5Authenticator::new();

        self.negotiate_auth_method(&mut stream, &mut authenticator).await?;
        self.authenticate(&mut stream, &authenticator).await?;
        self.relay(&mut stream).await?;

        Ok(stream.into_inner())
    }

    async fn negotiate_auth_method<S>(
        &mut self,
        stream: &mut Socks5Stream<S>,
        authenticator: &mut Socks5Authenticator,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        logging::log_step_started!("Method negotiation", self.proxy);

        let request = HandshakeRequest::new(authenticator.offered_methods().to_vec());
        stream.write_request(request).await?;

        let method = stream.read_response::<HandshakeResponse>().await?.method();
        self.auth_method = Some(method);
        authenticator.set_selected_method(method);

        // If the selected METHOD is X'FF', none of the methods listed by the
        // client are acceptable, and the client MUST close the connection.
        if method == AuthMethod::NoAcceptable {
            bail!(Socks5Error::MethodNotAcceptable)
        }

        logging::log_step_completed!("Method negotiation", self.proxy);
        Ok(())
    }

    async fn authenticate<S>(&mut self, stream: &mut Socks5Stream<S>, authenticator: &Socks5Authenticator) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        debug!("Authentication with proxy {} by {:?}", self.proxy, authenticator.current_method());
        authenticator.authenticate(&mut **stream).await
    }

    async fn relay<S>(&mut self, stream: &mut Socks5Stream<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        logging::log_step_started!(format!("CONNECT to {}", self.destination), self.proxy);

        stream.write_request(RelayRequest::connect(self.destination.clone())).await?;

        let response = stream.read_response::<RelayResponse>().await?;
        self.reply = response.status();
        response.validate()?;

        match response.status() {
            Some(ReplyStatus::Succeeded) => {}
            Some(status) => bail!(Socks5Error::ReplyInvalid(InvalidReply::Status(status))),
            None => bail!(Socks5Error::ReplyInvalidLength),
        }

        // Drain BND.ADDR and BND.PORT, so the next byte belongs to the destination.
        let trailer_len = response.skip_bound_address(&mut **stream).await?;
        self.reply_len = Some(4 + trailer_len);

        logging::log_step_completed!(format!("CONNECT to {}", self.destination), self.proxy);
        Ok(())
    }
}

pub struct ProxySessionBuilder {
    proxy: Address,
    destination: Address,
    connect_timeout: Option<Duration>,
    keep_alive: Option<TcpKeepalive>,
}

impl ProxySessionBuilder {
    pub fn with_connect_timeout(&mut self, connect_timeout: Duration) -> &mut ProxySessionBuilder {
        debug_assert!(self.connect_timeout.is_none(), "should be unset");
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn with_keepalive(&mut self, keep_alive: TcpKeepalive) -> &mut ProxySessionBuilder {
        debug_assert!(self.keep_alive.is_none(), "should be unset");
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn build(&self) -> ProxySession {
        let mut tcp_opts = TcpConnectionOptions::new();
        if let Some(keep_alive) = &self.keep_alive {
            tcp_opts.set_keepalive(keep_alive.clone());
        }

        ProxySession {
            proxy: self.proxy.clone(),
            destination: self.destination.clone(),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            tcp_opts,
            state: SessionState::NotStarted,
            auth_method: None,
            reply: None,
            reply_len: None,
        }
    }
}
