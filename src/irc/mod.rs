//! IRC protocol layer: line framing, pattern dispatch, event routing and the
//! reconnecting connection supervisor.

pub mod client;
pub mod connector;
pub mod dispatch;
pub mod event;
pub mod framer;
pub mod hooks;
pub mod sender;
pub mod session;

pub use client::{Client, ConnectionState};
pub use connector::{Connector, TcpConnector};
pub use dispatch::Dispatcher;
pub use event::{classify, Event, RemoteUser};
pub use framer::{LineCodec, LineFramer};
pub use hooks::{Hooks, NoHooks};
pub use sender::Sender;
pub use session::Session;
