//! Per-connection protocol state and event routing.

use tracing::{debug, info, trace, warn};

use crate::error::{ClientError, Result};

use super::event::{classify, Event};
use super::hooks::Hooks;
use super::sender::Sender;

/// State of one connection: what we asked to be called and what the server
/// actually granted. Created fresh for every connection attempt.
#[derive(Debug)]
pub struct Session {
    requested_nick: String,
    actual_nick: Option<String>,
    sender: Sender,
}

impl Session {
    pub fn new(requested_nick: impl Into<String>, sender: Sender) -> Self {
        Self {
            requested_nick: requested_nick.into(),
            actual_nick: None,
            sender,
        }
    }

    pub fn requested_nick(&self) -> &str {
        &self.requested_nick
    }

    /// The nickname assigned by the server. Only set once registration has
    /// completed; until then the server may still grant something else.
    pub fn actual_nick(&self) -> Option<&str> {
        self.actual_nick.as_deref()
    }

    pub fn is_registered(&self) -> bool {
        self.actual_nick.is_some()
    }

    /// Surface `line` to the raw hook, classify it and route the resulting
    /// event. Unrecognised lines are not an error.
    ///
    /// Returns [`ClientError::NicknameRejected`] when the server refuses the
    /// nickname; the connection attempt is over at that point.
    pub fn handle_line<H: Hooks + ?Sized>(&mut self, line: &str, hooks: &mut H) -> Result<()> {
        debug!("< {}", line);
        hooks.on_raw_line_received(line);

        match classify(line) {
            Some(event) => self.route(event, hooks),
            None => {
                trace!("no pattern matched");
                Ok(())
            }
        }
    }

    fn route<H: Hooks + ?Sized>(&mut self, event: Event, hooks: &mut H) -> Result<()> {
        let sender = &self.sender;
        match event {
            Event::Ping { token } => {
                sender.send_pong(&token)?;
            }
            Event::Registered { nick } => {
                if nick != self.requested_nick {
                    info!(requested = %self.requested_nick, assigned = %nick, "server assigned a different nickname");
                }
                info!(nick = %nick, "registration complete");
                let nick = self.actual_nick.insert(nick);
                hooks.on_registration_complete(sender, nick);
            }
            Event::NicknameRejected { code } => {
                warn!(nick = %self.requested_nick, code, "nickname rejected");
                return Err(ClientError::NicknameRejected {
                    nick: self.requested_nick.clone(),
                    code,
                });
            }
            Event::Notice { user, target, text } => hooks.on_notice(sender, &user, &target, &text),
            Event::Invite { user, channel, .. } => hooks.on_invite(sender, &user, &channel),
            Event::Join { user, channel } => hooks.on_join(sender, &user, &channel),
            Event::Message { user, target, text } => {
                hooks.on_message(sender, &user, &target, &text)
            }
            Event::Mode {
                user,
                target,
                modes,
            } => hooks.on_mode_change(sender, &user, &target, &modes),
            Event::Quit { user, text } => hooks.on_quit(sender, &user, &text),
        }
        Ok(())
    }
}
