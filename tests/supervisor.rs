//! Drives `Client` against scripted in-memory servers.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crabline::{
    CancellationToken, Client, ClientConfig, ClientError, ConnectionConfig, ConnectionState,
    Connector, Hooks, Identity, RemoteUser, Sender,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};

/// Hands out pre-made duplex streams, then refuses.
struct MockConnector {
    streams: VecDeque<DuplexStream>,
    attempts: Arc<Mutex<usize>>,
}

#[async_trait]
impl Connector for MockConnector {
    type Stream = DuplexStream;

    async fn connect(&mut self) -> io::Result<DuplexStream> {
        *self.attempts.lock().unwrap() += 1;
        self.streams
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "no more servers"))
    }
}

/// Server side of one mock connection.
struct Peer {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl Peer {
    fn new(stream: DuplexStream) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Next line from the client, CR stripped.
    async fn recv(&mut self) -> String {
        let line = self.lines.next_line().await.unwrap().expect("client closed");
        line.trim_end_matches('\r').to_string()
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn expect_registration(&mut self, nick: &str) {
        assert_eq!(self.recv().await, format!("NICK {}", nick));
        assert_eq!(self.recv().await, "USER crabline 0 * :Crab Line");
    }
}

#[derive(Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
    sent: Arc<Mutex<Vec<String>>>,
    on_registered: Option<CancellationToken>,
    rename_to: Option<String>,
}

impl Recorder {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Hooks for Recorder {
    fn on_connected(&mut self, _sender: &Sender) {
        self.push("connected".into());
    }
    fn on_disconnected(&mut self, error: Option<&ClientError>) {
        let event = match error {
            None => "disconnected".to_string(),
            Some(ClientError::Timeout(_)) => "disconnected: timeout".to_string(),
            Some(ClientError::NicknameRejected { nick, code }) => {
                format!("disconnected: rejected {} {}", nick, code)
            }
            Some(other) => format!("disconnected: {}", other),
        };
        self.push(event);
    }
    fn on_raw_line_sent(&mut self, line: &str) {
        self.sent.lock().unwrap().push(line.to_string());
    }
    fn on_registration_complete(&mut self, sender: &Sender, nick: &str) {
        self.push(format!("registered {}", nick));
        sender.send_join("#rust").unwrap();
        if let Some(token) = &self.on_registered {
            token.cancel();
        }
    }
    fn on_nickname_rejected(&mut self, identity: &mut Identity, code: u16) {
        self.push(format!("rejected {}", code));
        if let Some(nick) = &self.rename_to {
            identity.nickname = nick.clone();
        }
    }
    fn on_message(&mut self, _sender: &Sender, user: &RemoteUser, target: &str, text: &str) {
        self.push(format!("message {} {} {}", user.nick, target, text));
    }
}

fn config(reconnect_delay_secs: u64) -> ClientConfig {
    ClientConfig {
        identity: Identity {
            nickname: "crab".into(),
            username: "crabline".into(),
            local_host: "0".into(),
            host: "*".into(),
            realname: "Crab Line".into(),
        },
        connection: ConnectionConfig {
            read_timeout_secs: 3600,
            reconnect_delay_secs,
            max_line_len: None,
        },
    }
}

fn setup(
    servers: usize,
    hooks: Recorder,
    cfg: ClientConfig,
) -> (Client<MockConnector, Recorder>, Vec<Peer>, Arc<Mutex<usize>>) {
    let mut streams = VecDeque::new();
    let mut peers = Vec::new();
    for _ in 0..servers {
        let (client_side, server_side) = tokio::io::duplex(4096);
        streams.push_back(client_side);
        peers.push(Peer::new(server_side));
    }
    let attempts = Arc::new(Mutex::new(0));
    let connector = MockConnector {
        streams,
        attempts: attempts.clone(),
    };
    (Client::new(connector, hooks, cfg), peers, attempts)
}

fn events(recorder: &Recorder) -> Vec<String> {
    recorder.events.lock().unwrap().clone()
}

fn sent(recorder: &Recorder) -> Vec<String> {
    recorder.sent.lock().unwrap().clone()
}

#[tokio::test]
async fn reconnects_after_server_closes() {
    let (mut client, peers, attempts) = setup(2, Recorder::default(), config(0));
    let mut peers = peers.into_iter();
    let (mut first, mut second) = (peers.next().unwrap(), peers.next().unwrap());

    let server = async move {
        first.expect_registration("crab").await;
        drop(first);
        second.expect_registration("crab").await;
        drop(second);
    };

    let (result, ()) = tokio::join!(client.run(), server);

    assert!(matches!(result, Err(ClientError::Connect(_))));
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(*attempts.lock().unwrap(), 3);
    assert_eq!(
        events(client.hooks()),
        vec!["connected", "disconnected", "connected", "disconnected"]
    );
}

#[tokio::test]
async fn answers_ping_and_dispatches_messages() {
    let (mut client, peers, _) = setup(1, Recorder::default(), config(0));
    let mut peer = peers.into_iter().next().unwrap();

    let server = async move {
        peer.expect_registration("crab").await;
        peer.send(":irc.example.org 376 crab :End of /MOTD command.").await;
        assert_eq!(peer.recv().await, "JOIN #rust");
        peer.send("PING :irc.example.org").await;
        assert_eq!(peer.recv().await, "PONG :irc.example.org");
        peer.send(":alice!~al@example.org PRIVMSG #rust :hello world").await;
        peer.send(":srv 001 crab :ignored").await;
        peer.send("PING abc123").await;
        assert_eq!(peer.recv().await, "PONG abc123");
    };

    let (result, ()) = tokio::join!(client.run(), server);

    assert!(matches!(result, Err(ClientError::Connect(_))));
    assert_eq!(
        events(client.hooks()),
        vec![
            "connected",
            "registered crab",
            "message alice #rust hello world",
            "disconnected",
        ]
    );
    assert_eq!(
        sent(client.hooks()),
        vec![
            "NICK crab",
            "USER crabline 0 * :Crab Line",
            "JOIN #rust",
            "PONG :irc.example.org",
            "PONG abc123",
        ]
    );
}

#[tokio::test]
async fn unterminated_tail_at_close_is_a_clean_disconnect() {
    let (mut client, peers, _) = setup(1, Recorder::default(), config(0));
    let mut peer = peers.into_iter().next().unwrap();

    let server = async move {
        peer.expect_registration("crab").await;
        peer.writer
            .write_all(b":srv 001 crab :hi\r\n:a!u@h PRIVMSG #c :trunc")
            .await
            .unwrap();
        drop(peer);
    };

    let (result, ()) = tokio::join!(client.run(), server);

    assert!(matches!(result, Err(ClientError::Connect(_))));
    assert_eq!(events(client.hooks()), vec!["connected", "disconnected"]);
}

#[tokio::test]
async fn nickname_rejection_ends_attempt_and_allows_rename() {
    let hooks = Recorder {
        rename_to: Some("crab_".into()),
        ..Recorder::default()
    };
    let (mut client, peers, _) = setup(2, hooks, config(0));
    let mut peers = peers.into_iter();
    let (mut first, mut second) = (peers.next().unwrap(), peers.next().unwrap());

    let server = async move {
        first.expect_registration("crab").await;
        first.send(":srv 433 * crab :Nickname is already in use").await;
        second.expect_registration("crab_").await;
        second.send(":srv 422 crab_ :MOTD File is missing").await;
        assert_eq!(second.recv().await, "JOIN #rust");
        drop(first);
    };

    let (result, ()) = tokio::join!(client.run(), server);

    assert!(matches!(result, Err(ClientError::Connect(_))));
    assert_eq!(client.identity().nickname, "crab_");
    assert_eq!(
        events(client.hooks()),
        vec![
            "connected",
            "rejected 433",
            "disconnected: rejected crab 433",
            "connected",
            "registered crab_",
            "disconnected",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn idle_connection_times_out() {
    let (mut client, peers, _) = setup(1, Recorder::default(), config(0));
    let mut peer = peers.into_iter().next().unwrap();

    let server = async move {
        peer.expect_registration("crab").await;
        // Stay connected but silent for longer than the read timeout.
        tokio::time::sleep(std::time::Duration::from_secs(7200)).await;
        drop(peer);
    };

    let (result, ()) = tokio::join!(client.run(), server);

    assert!(matches!(result, Err(ClientError::Connect(_))));
    assert_eq!(
        events(client.hooks()),
        vec!["connected", "disconnected: timeout"]
    );
}

#[tokio::test]
async fn shutdown_flushes_queued_lines() {
    let token = CancellationToken::new();
    let hooks = Recorder {
        on_registered: Some(token.clone()),
        ..Recorder::default()
    };
    let (mut client, peers, attempts) = setup(1, hooks, config(0));
    let mut peer = peers.into_iter().next().unwrap();
    let sender = client.sender();

    let server = async move {
        peer.expect_registration("crab").await;
        sender.send_privmsg("NickServ", "IDENTIFY hunter2").unwrap();
        assert_eq!(peer.recv().await, "PRIVMSG NickServ :IDENTIFY hunter2");
        peer.send(":srv 376 crab :End of MOTD").await;
        assert_eq!(peer.recv().await, "JOIN #rust");
    };

    let (result, ()) = tokio::join!(client.run_until(token.clone()), server);

    result.unwrap();
    assert_eq!(*attempts.lock().unwrap(), 1);
    assert_eq!(
        events(client.hooks()),
        vec!["connected", "registered crab", "disconnected"]
    );
}

#[tokio::test]
async fn overlong_line_fails_connection() {
    let mut cfg = config(0);
    cfg.connection.max_line_len = Some(16);
    let (mut client, peers, _) = setup(1, Recorder::default(), cfg);
    let mut peer = peers.into_iter().next().unwrap();

    let server = async move {
        peer.expect_registration("crab").await;
        peer.send(":srv NOTICE * :this line is far too long").await;
        // Keep the stream open until the client gives up on it.
        let _ = peer.lines.next_line().await;
    };

    let (result, ()) = tokio::join!(client.run(), server);

    assert!(matches!(result, Err(ClientError::Connect(_))));
    let events = events(client.hooks());
    assert_eq!(events[0], "connected");
    assert!(events[1].starts_with("disconnected: framing error"), "{events:?}");
}
