mod console;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use crabline::config::{self, AppConfig, ServerConfig};
use crabline::{CancellationToken, Client, TcpConnector};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleHooks;
use crate::logging::ChatLogger;

/// Console IRC client: prints every line exchanged with the server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (default: <config_dir>/crabline/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Server hostname
    server: Option<String>,
    /// Server port
    port: Option<u16>,
    /// Nickname
    nick: Option<String>,
    /// Username
    user: Option<String>,
    /// Real name
    realname: Option<String>,
}

impl Cli {
    fn apply(self, cfg: &mut AppConfig) {
        if let Some(host) = self.server {
            cfg.server.host = host;
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(nick) = self.nick {
            cfg.identity.nickname = nick;
        }
        if let Some(user) = self.user {
            cfg.identity.username = user;
        }
        if let Some(realname) = self.realname {
            cfg.identity.realname = realname;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crabline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load_config(cli.config.as_deref())?;
    cli.apply(&mut cfg);

    let addr = resolve(&cfg.server).await?;
    tracing::info!(%addr, host = %cfg.server.host, "resolved server");

    let hooks = ConsoleHooks::new(cfg.channels.clone(), ChatLogger::new(&cfg.logging));
    let mut client = Client::new(TcpConnector::new(addr), hooks, cfg.client_config());

    let shutdown = CancellationToken::new();
    let sender = client.sender();
    let token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = sender.send_quit(Some("crabline"));
            token.cancel();
        }
    });

    let retry_delay = cfg.connection.reconnect_delay();
    loop {
        match client.run_until(shutdown.clone()).await {
            Ok(()) => break,
            Err(e) => {
                tracing::error!("{}", e);
                eprintln!("Error: {}", e);
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
            }
        }
    }

    Ok(())
}

async fn resolve(server: &ServerConfig) -> Result<SocketAddr> {
    tokio::net::lookup_host((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to resolve {}", server.host))?
        .next()
        .with_context(|| format!("No addresses found for {}", server.host))
}
