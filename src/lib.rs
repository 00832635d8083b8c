//! A small, reusable IRC client engine.
//!
//! One [`Client`] owns one connection at a time: it frames the byte stream
//! into CR-LF lines, classifies each line against a fixed, ordered pattern
//! table, and calls the matching [`Hooks`] method. When the connection dies
//! it reports the disconnect and connects again.

pub mod config;
pub mod error;
pub mod irc;

pub use config::{ClientConfig, ConnectionConfig, Identity};
pub use error::{ClientError, FramerError};
pub use irc::{Client, ConnectionState, Connector, Hooks, RemoteUser, Sender, TcpConnector};
pub use tokio_util::sync::CancellationToken;
