use kaa_proto::format_command;
use tokio::sync::mpsc;

use crate::error::OutboxClosed;

/// Producer handle for the outbound line queue of one connection.
///
/// Lines are written in the order they are queued. Each one is cut at its
/// first line break and capped in length by the transport before it reaches
/// the socket.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Queue a preformatted line.
    pub fn send_raw(&self, line: impl Into<String>) -> Result<(), OutboxClosed> {
        self.tx.send(line.into()).map_err(|_| OutboxClosed)
    }

    /// Queue `command` with `args`, marking the last one as trailing if asked.
    pub fn command<S: AsRef<str>>(
        &self,
        command: &str,
        args: &[S],
        trailing: bool,
    ) -> Result<(), OutboxClosed> {
        self.send_raw(format_command(command, args, trailing))
    }

    pub fn nick(&self, nick: &str) -> Result<(), OutboxClosed> {
        self.command("NICK", &[nick], false)
    }

    /// `USER <user> 3 * :<realname>`
    pub fn user(&self, user: &str, realname: &str) -> Result<(), OutboxClosed> {
        self.command("USER", &[user, "3", "*", realname], true)
    }

    pub fn join(&self, channel: &str) -> Result<(), OutboxClosed> {
        self.command("JOIN", &[channel], false)
    }

    pub fn privmsg(&self, target: &str, text: &str) -> Result<(), OutboxClosed> {
        self.command("PRIVMSG", &[target, text], true)
    }

    pub fn pong(&self, token: &str) -> Result<(), OutboxClosed> {
        self.command("PONG", &[token], true)
    }

    pub fn quit(&self, reason: &str) -> Result<(), OutboxClosed> {
        self.command("QUIT", &[reason], true)
    }

    /// Whether the send loop has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
