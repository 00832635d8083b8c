//! Protocol events and the canonical line-pattern table.

use std::fmt;
use std::sync::LazyLock;

use regex::Captures;

use super::dispatch::Dispatcher;

/// The originator of a relayed message, rebuilt from every line's
/// `nick!user@host` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub nick: String,
    pub user: String,
    pub host: String,
}

impl RemoteUser {
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Groups 1..=3 of a user-prefixed pattern.
    fn from_captures(caps: &Captures<'_>) -> Self {
        Self::new(&caps[1], &caps[2], &caps[3])
    }
}

impl fmt::Display for RemoteUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nick, self.user, self.host)
    }
}

/// A line the engine understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Ping { token: String },
    /// End of MOTD (376) or no MOTD (422): registration is complete.
    Registered { nick: String },
    /// 433 / 437: the requested nickname is unavailable.
    NicknameRejected { code: u16 },
    Notice { user: RemoteUser, target: String, text: String },
    Invite { user: RemoteUser, target: String, channel: String },
    Join { user: RemoteUser, channel: String },
    Message { user: RemoteUser, target: String, text: String },
    Mode { user: RemoteUser, target: String, modes: String },
    Quit { user: RemoteUser, text: String },
}

// `:?` makes the leading prefix colon optional; lazy field matches keep the
// trailing `:text` group open to the end of the line, spaces included.
const USER_PREFIX: &str = r":?([^ ]+?)!([^ ]+?)@([^ ]+?)";
const SERVER_PREFIX: &str = r":?[^ ]+?";

/// Canonical bindings, in precedence order:
///
/// 1. `ping` - `PING <token>`
/// 2. `registered` - `<server> 376|422 <nick> :<text>`
/// 3. `nick-in-use` - `<server> 433 ...`
/// 4. `nick-unavailable` - `<server> 437 ...`
/// 5. `notice` - `<prefix> NOTICE <target> :<text>`
/// 6. `invite` - `<prefix> INVITE <target> :<channel>`
/// 7. `join` - `<prefix> JOIN <channel>`
/// 8. `privmsg` - `<prefix> PRIVMSG <target> :<text>`
/// 9. `mode` - `<prefix> MODE <target> :<modes>`
/// 10. `quit` - `<prefix> QUIT :<text>`
// The patterns are constants; `test_table_order` builds this table.
pub static EVENTS: LazyLock<Dispatcher<Event>> = LazyLock::new(|| {
    build_event_table().expect("canonical event patterns are valid regexes")
});

fn build_event_table() -> Result<Dispatcher<Event>, regex::Error> {
    Ok(Dispatcher::builder()
        .bind("ping", r"PING (.+?)", |c| Event::Ping {
            token: c[1].to_string(),
        })?
        .bind(
            "registered",
            &format!(r"{SERVER_PREFIX} (?:376|422) ([^ ]+?) :?(.+?)"),
            |c| Event::Registered {
                nick: c[1].to_string(),
            },
        )?
        .bind("nick-in-use", &format!(r"{SERVER_PREFIX} 433 (.+?)"), |_| {
            Event::NicknameRejected { code: 433 }
        })?
        .bind(
            "nick-unavailable",
            &format!(r"{SERVER_PREFIX} 437 (.+?)"),
            |_| Event::NicknameRejected { code: 437 },
        )?
        .bind(
            "notice",
            &format!(r"{USER_PREFIX} NOTICE ([^ ]+?) :?(.+?)"),
            |c| Event::Notice {
                user: RemoteUser::from_captures(c),
                target: c[4].to_string(),
                text: c[5].to_string(),
            },
        )?
        .bind(
            "invite",
            &format!(r"{USER_PREFIX} INVITE ([^ ]+?) :?(.+?)"),
            |c| Event::Invite {
                user: RemoteUser::from_captures(c),
                target: c[4].to_string(),
                channel: c[5].to_string(),
            },
        )?
        .bind("join", &format!(r"{USER_PREFIX} JOIN :?([^ ]+?)"), |c| {
            Event::Join {
                user: RemoteUser::from_captures(c),
                channel: c[4].to_string(),
            }
        })?
        .bind(
            "privmsg",
            &format!(r"{USER_PREFIX} PRIVMSG ([^ ]+?) :?(.+?)"),
            |c| Event::Message {
                user: RemoteUser::from_captures(c),
                target: c[4].to_string(),
                text: c[5].to_string(),
            },
        )?
        .bind(
            "mode",
            &format!(r"{USER_PREFIX} MODE ([^ ]+?) :?(.+?)"),
            |c| Event::Mode {
                user: RemoteUser::from_captures(c),
                target: c[4].to_string(),
                modes: c[5].to_string(),
            },
        )?
        .bind("quit", &format!(r"{USER_PREFIX} QUIT :?(.+?)"), |c| {
            Event::Quit {
                user: RemoteUser::from_captures(c),
                text: c[4].to_string(),
            }
        })?
        .build())
}

/// Classify a single line, or `None` if no canonical pattern matches.
pub fn classify(line: &str) -> Option<Event> {
    EVENTS.dispatch(line)
}
