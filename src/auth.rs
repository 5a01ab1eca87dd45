use crate::{
    common::error::{Precondition, Socks5Error, Unsupported},
    proto::socks5::AuthMethod,
};
use anyhow::{bail, Result};
use tokio::io::{AsyncRead, AsyncWrite};

/// Client side of the method-specific sub-negotiation.
pub struct Socks5Authenticator {
    offered_methods: Vec<AuthMethod>,
    selected_method: Option<AuthMethod>,
}

impl Socks5Authenticator {
    pub fn new() -> Socks5Authenticator {
        Socks5Authenticator {
            offered_methods: vec![AuthMethod::None],
            selected_method: None,
        }
    }

    /// Methods advertised in the handshake request.
    pub fn offered_methods(&self) -> &[AuthMethod] {
        &self.offered_methods
    }

    pub fn current_method(&self) -> Option<AuthMethod> {
        self.selected_method
    }

    /// Records the method chosen by the proxy.
    pub fn set_selected_method(&mut self, method: AuthMethod) {
        debug_assert!(self.selected_method.is_none(), "should be unset");
        self.selected_method = Some(method);
    }

    /// Runs the sub-negotiation for the selected method over ```stream```.
    pub async fn authenticate<S: AsyncRead + AsyncWrite + Unpin>(&self, _stream: &mut S) -> Result<()> {
        let Some(method) = self.selected_method else {
            bail!(Socks5Error::Precondition(Precondition::AuthMethodNotNegotiated))
        };

        match method {
            AuthMethod::None => Ok(()),
            // RFC 1929 username/password sub-negotiation would be exchanged over `_stream` here.
            AuthMethod::GssAPI | AuthMethod::Password => {
                bail!(Socks5Error::Unsupported(Unsupported::AuthMethod(method)))
            }
            AuthMethod::NoAcceptable => bail!(Socks5Error::MethodNotAcceptable),
        }
    }
}

impl Default for Socks5Authenticator {
    fn default() -> Self {
        Socks5Authenticator::new()
    }
}
