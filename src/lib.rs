pub mod config;
pub mod proto;
pub mod session;

mod auth;
mod common;
mod io;

pub use common::{
    error::{InvalidReply, InvalidValue, Precondition, Socks5Error, Unsupported},
    net::{tcp::TcpConnectionOptions, Address},
};
pub use session::{ProxySession, ProxySessionBuilder, SessionState};
