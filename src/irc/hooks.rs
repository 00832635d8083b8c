//! Extension points for the embedding application.

use crate::config::Identity;
use crate::error::ClientError;

use super::event::RemoteUser;
use super::sender::Sender;

/// Callbacks invoked by the client as the connection progresses.
///
/// Every method defaults to a no-op; implement only the ones you need.
/// Hooks run on the client's own task, in line order, so a slow hook delays
/// reading the next line. Lines queued on the [`Sender`] from inside a hook
/// are written as soon as the hook returns.
pub trait Hooks: Send {
    /// A socket was opened; `NICK`/`USER` have not been sent yet.
    fn on_connected(&mut self, _sender: &Sender) {}

    /// The connection ended. `error` is `None` when the server closed the
    /// stream cleanly.
    fn on_disconnected(&mut self, _error: Option<&ClientError>) {}

    /// Every inbound line, before dispatch, whether or not it matches.
    fn on_raw_line_received(&mut self, _line: &str) {}

    /// Every outbound line, after it was written.
    fn on_raw_line_sent(&mut self, _line: &str) {}

    /// End of MOTD: `nick` is the nickname the server actually assigned.
    fn on_registration_complete(&mut self, _sender: &Sender, _nick: &str) {}

    /// The server refused the nickname (433 or 437). Runs before
    /// [`Hooks::on_disconnected`]; changes to `identity` apply to the next
    /// connection attempt.
    fn on_nickname_rejected(&mut self, _identity: &mut Identity, _code: u16) {}

    fn on_notice(&mut self, _sender: &Sender, _user: &RemoteUser, _target: &str, _text: &str) {}

    fn on_invite(&mut self, _sender: &Sender, _user: &RemoteUser, _channel: &str) {}

    fn on_join(&mut self, _sender: &Sender, _user: &RemoteUser, _channel: &str) {}

    fn on_message(&mut self, _sender: &Sender, _user: &RemoteUser, _target: &str, _text: &str) {}

    fn on_mode_change(&mut self, _sender: &Sender, _user: &RemoteUser, _target: &str, _modes: &str) {
    }

    fn on_quit(&mut self, _sender: &Sender, _user: &RemoteUser, _text: &str) {}
}

/// Hooks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl Hooks for NoHooks {}
