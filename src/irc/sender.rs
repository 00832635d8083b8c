//! Outbound command handle.

use tokio::sync::mpsc;

use crate::error::{ClientError, Result};

/// Cloneable handle for queueing outbound lines.
///
/// Lines go onto an unbounded queue that the client drains between reads,
/// so sending never blocks the caller. The handle stays valid across
/// reconnects; lines queued while disconnected are dropped when the next
/// connection opens.
#[derive(Debug, Clone)]
pub struct Sender {
    tx: mpsc::UnboundedSender<String>,
}

impl Sender {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a raw protocol line (without terminator).
    ///
    /// Anything from the first CR or LF onward is dropped so one call can
    /// never produce more than one command.
    pub fn send_raw(&self, line: impl Into<String>) -> Result<()> {
        let line = sanitize(line.into());
        self.tx.send(line).map_err(|_| ClientError::Stopped)
    }

    pub fn send_nick(&self, nick: &str) -> Result<()> {
        self.send_raw(format!("NICK {}", nick))
    }

    pub fn send_user(&self, user: &str, local_host: &str, host: &str, realname: &str) -> Result<()> {
        self.send_raw(format!("USER {} {} {} :{}", user, local_host, host, realname))
    }

    pub fn send_join(&self, channel: &str) -> Result<()> {
        self.send_raw(format!("JOIN {}", channel))
    }

    pub fn send_privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.send_raw(format!("PRIVMSG {} :{}", target, text))
    }

    pub fn send_notice(&self, target: &str, text: &str) -> Result<()> {
        self.send_raw(format!("NOTICE {} :{}", target, text))
    }

    pub fn send_pong(&self, token: &str) -> Result<()> {
        self.send_raw(format!("PONG {}", token))
    }

    pub fn send_quit(&self, message: Option<&str>) -> Result<()> {
        match message {
            Some(msg) => self.send_raw(format!("QUIT :{}", msg)),
            None => self.send_raw("QUIT"),
        }
    }
}

fn sanitize(mut line: String) -> String {
    if let Some(pos) = line.find(['\r', '\n']) {
        tracing::warn!(line = %line.escape_debug(), "truncating outbound line at line break");
        line.truncate(pos);
    }
    line
}
