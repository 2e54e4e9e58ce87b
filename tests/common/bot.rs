//! Test bot process management.
//!
//! Writes a config into a temporary directory and spawns the `kaa` binary
//! built for this test run.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::{Child, Command};

/// A running bot instance.
pub struct TestBot {
    child: Child,
    dir: TempDir,
}

impl TestBot {
    /// Spawn a bot pointed at `127.0.0.1:port` that joins `channels`.
    ///
    /// `extra` is appended to the `[session]` table.
    pub fn spawn(port: u16, channels: &[&str], extra: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let channels = channels
            .iter()
            .map(|c| format!("{c:?}"))
            .collect::<Vec<_>>()
            .join(", ");

        let config = format!(
            r#"
[server]
host = "127.0.0.1"
port = {port}

[identity]
nick = "kaa"
realname = "Kaa integration test"

[session]
channels = [{channels}]
registration_grace_ms = 50
{extra}

[log]
level = "debug"
dir = "{logs}"
"#,
            logs = dir.path().join("logs").display(),
        );

        let config_path = dir.path().join("kaa.toml");
        std::fs::write(&config_path, config)?;

        let child = Command::new(env!("CARGO_BIN_EXE_kaa"))
            .arg(&config_path)
            .env_remove("RUST_LOG")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        Ok(Self { child, dir })
    }

    /// Wait for the process to exit on its own.
    pub async fn wait_exit(&mut self, limit: Duration) -> anyhow::Result<ExitStatus> {
        Ok(tokio::time::timeout(limit, self.child.wait()).await??)
    }

    /// Whether the process is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("logs").join("kaa.log")
    }
}
