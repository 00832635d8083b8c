//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::nickname::generate_nickname;

/// Root configuration for the console client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Joined after every successful registration.
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// The part of the configuration the client engine consumes.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            identity: self.identity.clone(),
            connection: self.connection.clone(),
        }
    }
}

/// Server endpoint. Name resolution is up to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Who we claim to be during registration
/// (`NICK <nickname>`, `USER <username> <local_host> <host> :<realname>`).
///
/// Fixed for the lifetime of one connection attempt; may be changed between
/// attempts, e.g. from [`crate::irc::Hooks::on_nickname_rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_local_host")]
    pub local_host: String,
    #[serde(default = "default_claimed_host")]
    pub host: String,
    #[serde(default = "default_realname")]
    pub realname: String,
}

impl Identity {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            nickname: default_nickname(),
            username: default_username(),
            local_host: default_local_host(),
            host: default_claimed_host(),
            realname: default_realname(),
        }
    }
}

/// Connection supervision settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Drop the connection after this long without a complete inbound line.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Pause between a disconnect and the next attempt. `0` reconnects
    /// immediately.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
    /// Longest accepted inbound line in bytes, terminator excluded. Unset
    /// means unbounded.
    #[serde(default)]
    pub max_line_len: Option<usize>,
}

impl ConnectionConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: default_read_timeout(),
            reconnect_delay_secs: default_reconnect_delay(),
            max_line_len: None,
        }
    }
}

/// Everything [`crate::irc::Client`] needs besides a connector and hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub identity: Identity,
    pub connection: ConnectionConfig,
}

/// Chat transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_true")]
    pub log_channels: bool,
    #[serde(default)]
    pub log_queries: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            log_channels: true,
            log_queries: false,
        }
    }
}

fn default_host() -> String {
    "irc.libera.chat".to_string()
}
fn default_port() -> u16 {
    6667
}
fn default_nickname() -> String {
    generate_nickname()
}
fn default_username() -> String {
    "crabline".to_string()
}
fn default_local_host() -> String {
    "0".to_string()
}
fn default_claimed_host() -> String {
    "*".to_string()
}
fn default_realname() -> String {
    "crabline".to_string()
}
fn default_read_timeout() -> u64 {
    60 * 60 // 1 hour
}
fn default_reconnect_delay() -> u64 {
    5
}
fn default_true() -> bool {
    true
}
fn default_log_dir() -> String {
    "~/.local/share/crabline/logs".to_string()
}
