//! Connection supervisor.
//!
//! [`Client::run`] loops forever: connect, register, read lines until the
//! connection dies, report the disconnect, wait, and start over. Only one
//! connection is live at a time and everything for it happens on the
//! caller's task.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, Identity};
use crate::error::{ClientError, FramerError, Result};

use super::connector::Connector;
use super::framer::LineCodec;
use super::hooks::Hooks;
use super::sender::Sender;
use super::session::Session;

/// Where the supervisor is in the connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// `NICK`/`USER` sent, waiting for end of MOTD.
    Registering,
    /// Registration complete.
    ReadLoop,
}

/// How a connection ended without an error.
enum Ended {
    /// The server closed the stream.
    Closed,
    /// The shutdown token was cancelled.
    Shutdown,
}

/// What woke the read loop.
enum Wake {
    Shutdown,
    Inbound(Option<std::result::Result<String, FramerError>>),
    Outbound(String),
    Idle,
}

pub struct Client<C: Connector, H: Hooks> {
    connector: C,
    hooks: H,
    config: ClientConfig,
    sender: Sender,
    outbound: mpsc::UnboundedReceiver<String>,
    state: ConnectionState,
}

impl<C: Connector, H: Hooks> Client<C, H> {
    pub fn new(connector: C, hooks: H, config: ClientConfig) -> Self {
        let (sender, outbound) = Sender::channel();
        Self {
            connector,
            hooks,
            config,
            sender,
            outbound,
            state: ConnectionState::Disconnected,
        }
    }

    /// Handle for queueing outbound lines from outside the hooks.
    pub fn sender(&self) -> Sender {
        self.sender.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.config.identity
    }

    /// Change the identity used by the next connection attempt.
    pub fn identity_mut(&mut self) -> &mut Identity {
        &mut self.config.identity
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Connect and keep reconnecting forever.
    ///
    /// Only returns if the socket cannot be opened at all
    /// ([`ClientError::Connect`]); whether to try again is the caller's call.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(CancellationToken::new()).await
    }

    /// Like [`Client::run`], but returns `Ok(())` once `shutdown` is
    /// cancelled. Lines already queued on the [`Sender`] are written, and
    /// [`Hooks::on_disconnected`] fires, before returning.
    pub async fn run_until(&mut self, shutdown: CancellationToken) -> Result<()> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(());
            }

            self.state = ConnectionState::Connecting;
            let stream = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    self.state = ConnectionState::Disconnected;
                    return Ok(());
                }
                res = self.connector.connect() => res,
            };
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    self.state = ConnectionState::Disconnected;
                    warn!("connect failed: {}", e);
                    return Err(ClientError::Connect(e));
                }
            };

            info!(nick = %self.config.identity.nickname, "connected");
            let outcome = self.run_connection(stream, &shutdown).await;
            self.state = ConnectionState::Disconnected;

            match outcome {
                Ok(Ended::Shutdown) => {
                    info!("shutting down");
                    self.hooks.on_disconnected(None);
                    return Ok(());
                }
                Ok(Ended::Closed) => {
                    info!("server closed the connection");
                    self.hooks.on_disconnected(None);
                }
                Err(err) => {
                    if let ClientError::NicknameRejected { code, .. } = &err {
                        self.hooks
                            .on_nickname_rejected(&mut self.config.identity, *code);
                    }
                    warn!("disconnected: {}", err);
                    self.hooks.on_disconnected(Some(&err));
                }
            }

            let delay = self.config.connection.reconnect_delay();
            if !delay.is_zero() {
                debug!(?delay, "waiting before reconnecting");
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    async fn run_connection(
        &mut self,
        stream: C::Stream,
        shutdown: &CancellationToken,
    ) -> Result<Ended> {
        let codec = match self.config.connection.max_line_len {
            Some(max) => LineCodec::with_max_len(max),
            None => LineCodec::new(),
        };
        let mut framed = Framed::new(stream, codec);
        let identity = self.config.identity.clone();
        let mut session = Session::new(identity.nickname.clone(), self.sender.clone());

        self.discard_stale_outbound();
        self.hooks.on_connected(&self.sender);

        self.state = ConnectionState::Registering;
        self.sender.send_nick(&identity.nickname)?;
        self.sender.send_user(
            &identity.username,
            &identity.local_host,
            &identity.host,
            &identity.realname,
        )?;
        self.flush(&mut framed).await?;

        let read_timeout = self.config.connection.read_timeout();
        let mut deadline = Instant::now() + read_timeout;

        loop {
            let wake = tokio::select! {
                biased;
                _ = shutdown.cancelled() => Wake::Shutdown,
                item = framed.next() => Wake::Inbound(item),
                Some(line) = self.outbound.recv() => Wake::Outbound(line),
                _ = sleep_until(deadline) => Wake::Idle,
            };

            match wake {
                Wake::Shutdown => {
                    self.flush(&mut framed).await?;
                    if let Err(e) = SinkExt::<String>::close(&mut framed).await {
                        debug!("error closing connection: {}", e);
                    }
                    return Ok(Ended::Shutdown);
                }
                Wake::Inbound(None) => return Ok(Ended::Closed),
                Wake::Inbound(Some(Err(e))) => return Err(e.into()),
                Wake::Inbound(Some(Ok(line))) => {
                    deadline = Instant::now() + read_timeout;
                    let was_registered = session.is_registered();
                    session.handle_line(&line, &mut self.hooks)?;
                    if !was_registered && session.is_registered() {
                        self.state = ConnectionState::ReadLoop;
                    }
                    self.flush(&mut framed).await?;
                }
                Wake::Outbound(line) => {
                    self.write_line(&mut framed, line).await?;
                    self.flush(&mut framed).await?;
                }
                Wake::Idle => return Err(ClientError::Timeout(read_timeout)),
            }
        }
    }

    /// Write every queued outbound line.
    async fn flush(&mut self, framed: &mut Framed<C::Stream, LineCodec>) -> Result<()> {
        while let Ok(line) = self.outbound.try_recv() {
            self.write_line(framed, line).await?;
        }
        Ok(())
    }

    async fn write_line(
        &mut self,
        framed: &mut Framed<C::Stream, LineCodec>,
        line: String,
    ) -> Result<()> {
        debug!("> {}", line);
        framed.send(line.clone()).await?;
        self.hooks.on_raw_line_sent(&line);
        Ok(())
    }

    fn discard_stale_outbound(&mut self) {
        let mut dropped = 0usize;
        while self.outbound.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "discarded lines queued while disconnected");
        }
    }
}
