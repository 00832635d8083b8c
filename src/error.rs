//! Error types for the client engine.

use std::time::Duration;
use thiserror::Error;

/// Errors produced while splitting the inbound byte stream into lines.
#[derive(Debug, Error)]
pub enum FramerError {
    #[error("line of {actual} bytes exceeds the {limit} byte limit")]
    LineTooLong { actual: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a connection attempt ended.
///
/// Transport faults (see [`ClientError::is_transient`]) are recovered from by
/// reconnecting. A rejected nickname also ends only the current attempt, but
/// is reported distinctly so the consumer can pick another nickname.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect: {0}")]
    Connect(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("framing error: {0}")]
    Framing(#[source] FramerError),

    #[error("no data received for {0:?}")]
    Timeout(Duration),

    #[error("nickname {nick} rejected by server ({code})")]
    NicknameRejected { nick: String, code: u16 },

    #[error("client is no longer running")]
    Stopped,
}

impl ClientError {
    /// `true` for faults of the transport itself, `false` when the server
    /// refused the registration or the client is gone.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            ClientError::NicknameRejected { .. } | ClientError::Stopped
        )
    }
}

impl From<FramerError> for ClientError {
    fn from(err: FramerError) -> Self {
        match err {
            FramerError::Io(e) => ClientError::Io(e),
            other => ClientError::Framing(other),
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
