//! Scripted IRC server.
//!
//! Accepts one client at a time and lets the test read what the bot sends
//! and push server lines back.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

const STEP: Duration = Duration::from_secs(10);

/// Listening socket the bot is pointed at.
pub struct ScriptedServer {
    listener: TcpListener,
}

/// One accepted client connection.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ScriptedServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<ServerConn> {
        let (stream, _) = timeout(STEP, self.listener.accept()).await??;
        let (reader, writer) = stream.into_split();
        Ok(ServerConn {
            reader: BufReader::new(reader),
            writer,
        })
    }
}

impl ServerConn {
    /// Next line from the bot without its terminator, `None` at EOF.
    pub async fn recv(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let n = timeout(STEP, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            return Ok(None);
        }
        let Some(stripped) = line.strip_suffix("\r\n") else {
            anyhow::bail!("line without CRLF terminator: {line:?}");
        };
        Ok(Some(stripped.to_string()))
    }

    /// Read lines until one starts with `prefix`, skipping the rest.
    pub async fn recv_until(&mut self, prefix: &str) -> anyhow::Result<String> {
        while let Some(line) = self.recv().await? {
            if line.starts_with(prefix) {
                return Ok(line);
            }
        }
        anyhow::bail!("connection closed before {prefix:?}")
    }

    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        Ok(())
    }
}
