//! End-to-end tests running the `kaa` binary against a scripted server.

mod common;

use std::time::Duration;

use common::{ScriptedServer, TestBot};

#[tokio::test]
async fn test_bot_registers_joins_and_answers_ping() -> anyhow::Result<()> {
    let server = ScriptedServer::bind().await?;
    let mut bot = TestBot::spawn(server.port(), &["#kaa", "#rust"], "")?;
    let mut conn = server.accept().await?;

    assert_eq!(conn.recv().await?.as_deref(), Some("NICK kaa"));
    assert_eq!(
        conn.recv().await?.as_deref(),
        Some("USER kaa 3 * :Kaa integration test")
    );

    conn.send(":irc.test 001 kaa :Welcome to the test network kaa")
        .await?;
    assert_eq!(conn.recv().await?.as_deref(), Some("JOIN #kaa"));
    assert_eq!(conn.recv().await?.as_deref(), Some("JOIN #rust"));

    conn.send("PING :e2e-token").await?;
    assert_eq!(conn.recv().await?.as_deref(), Some("PONG :e2e-token"));

    // End of MOTD triggers the join list again.
    conn.send(":irc.test 376 kaa :End of /MOTD command.").await?;
    assert_eq!(conn.recv().await?.as_deref(), Some("JOIN #kaa"));
    assert_eq!(conn.recv().await?.as_deref(), Some("JOIN #rust"));

    // Without reconnect_delay the bot exits with an error once the server
    // goes away.
    drop(conn);
    let status = bot.wait_exit(Duration::from_secs(10)).await?;
    assert!(!status.success());

    let log = std::fs::read_to_string(bot.log_path())?;
    assert!(log.contains("registered"));
    assert!(log.contains("JOIN #rust"));
    Ok(())
}

#[tokio::test]
async fn test_bot_reconnects_when_configured() -> anyhow::Result<()> {
    let server = ScriptedServer::bind().await?;
    let mut bot = TestBot::spawn(server.port(), &["#kaa"], "reconnect_delay = 1")?;

    let mut conn = server.accept().await?;
    conn.recv_until("USER ").await?;
    drop(conn);

    let mut conn = server.accept().await?;
    assert_eq!(conn.recv().await?.as_deref(), Some("NICK kaa"));
    assert!(bot.is_running());
    Ok(())
}

#[tokio::test]
async fn test_bot_refuses_invalid_config() -> anyhow::Result<()> {
    let server = ScriptedServer::bind().await?;
    let mut bot = TestBot::spawn(server.port(), &["nohash"], "")?;

    let status = bot.wait_exit(Duration::from_secs(10)).await?;
    assert!(!status.success());
    Ok(())
}
