//! kaa - a small hook-driven IRC bot.
//!
//! Usage: `kaa [config.toml]` (default `kaa.toml`).

use anyhow::Context as _;
use kaa::SessionError;
use kaa::config::Config;
use kaa::kaa_proto::Message;
use kaa::session::Session;
use kaa::telemetry;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "kaa.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config {config_path}"))?;

    // Initialize tracing
    if let Some(path) = telemetry::init(&config.log)? {
        eprintln!("kaa: logging to {}", path.display());
    }

    info!(
        host = %config.server.host,
        port = config.server.port,
        tls = config.server.tls,
        nick = %config.identity.nick,
        channels = ?config.session.channels,
        "Starting kaa"
    );

    let mut session = Session::new(&config);
    spawn_message_log(session.subscribe());

    loop {
        let ended = tokio::select! {
            result = run_connection(&mut session) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        let Some(result) = ended else {
            info!("interrupted, shutting down");
            if let Err(e) = session.disconnect().await {
                warn!(error = %e, "connection was already closed");
            }
            return Ok(());
        };

        let err = match result {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        let Some(delay) = config.session.reconnect_delay() else {
            error!(error = %err, "connection lost");
            return Err(err.into());
        };

        warn!(error = %err, delay_secs = delay.as_secs(), "connection lost, reconnecting");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

/// Connect, register, and run until the connection ends.
async fn run_connection(session: &mut Session) -> Result<(), SessionError> {
    session.connect().await?;
    session.wait().await
}

/// Log every PRIVMSG the bot sees.
fn spawn_message_log(mut events: broadcast::Receiver<Message>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(msg) if msg.command == "privmsg" => info!(
                    from = msg.source_nick().unwrap_or("?"),
                    target = msg.arg(0).unwrap_or_default(),
                    text = %msg.trailing(),
                    "message"
                ),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "message log fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
