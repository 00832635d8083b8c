//! Hooks that echo the session to the terminal.

use crabline::config::nickname::fallback_nickname;
use crabline::{ClientError, Hooks, Identity, RemoteUser, Sender};

use crate::logging::{ChatLogger, EntryKind};

pub struct ConsoleHooks {
    channels: Vec<String>,
    transcript: ChatLogger,
    nick: Option<String>,
}

impl ConsoleHooks {
    pub fn new(channels: Vec<String>, transcript: ChatLogger) -> Self {
        Self {
            channels,
            transcript,
            nick: None,
        }
    }

    /// Private messages are filed under the sender, not under our own nick.
    fn conversation<'a>(&self, user: &'a RemoteUser, target: &'a str) -> &'a str {
        match &self.nick {
            Some(nick) if nick == target => &user.nick,
            _ => target,
        }
    }
}

impl Hooks for ConsoleHooks {
    fn on_connected(&mut self, _sender: &Sender) {
        println!("Connected");
    }

    fn on_disconnected(&mut self, error: Option<&ClientError>) {
        self.nick = None;
        match error {
            Some(e) => println!("Disconnected: {}", e),
            None => println!("Disconnected"),
        }
    }

    fn on_raw_line_received(&mut self, line: &str) {
        println!("< {}", line);
    }

    fn on_raw_line_sent(&mut self, line: &str) {
        println!("> {}", line);
    }

    fn on_registration_complete(&mut self, sender: &Sender, nick: &str) {
        self.nick = Some(nick.to_string());
        for channel in &self.channels {
            if let Err(e) = sender.send_join(channel) {
                tracing::warn!("cannot join {}: {}", channel, e);
            }
        }
    }

    fn on_nickname_rejected(&mut self, identity: &mut Identity, code: u16) {
        let next = fallback_nickname(&identity.nickname);
        println!(
            "Nickname {} unavailable ({}), retrying as {}",
            identity.nickname, code, next
        );
        identity.nickname = next;
    }

    fn on_notice(&mut self, _sender: &Sender, user: &RemoteUser, target: &str, text: &str) {
        println!("-{}- {}", user.nick, text);
        let conversation = self.conversation(user, target);
        self.transcript
            .log(conversation, EntryKind::Notice, &user.nick, text);
    }

    fn on_invite(&mut self, _sender: &Sender, user: &RemoteUser, channel: &str) {
        println!("{} invites you to {}", user.nick, channel);
    }

    fn on_join(&mut self, _sender: &Sender, user: &RemoteUser, channel: &str) {
        self.transcript.log(
            channel,
            EntryKind::Join,
            &user.nick,
            &format!("({}@{}) joined {}", user.user, user.host, channel),
        );
    }

    fn on_message(&mut self, _sender: &Sender, user: &RemoteUser, target: &str, text: &str) {
        println!("[{}] <{}@{}> {}", target, user.nick, user.host, text);
        let conversation = self.conversation(user, target);
        self.transcript
            .log(conversation, EntryKind::Message, &user.nick, text);
    }
}
