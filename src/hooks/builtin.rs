//! Hooks installed by every session.

use async_trait::async_trait;
use kaa_proto::Message;
use tracing::info;

use super::{Hook, HookContext};
use crate::session::SessionState;

/// Answers `PING <token>` with `PONG :<token>`.
pub struct PingHook;

#[async_trait]
impl Hook for PingHook {
    async fn handle(&self, ctx: &HookContext, msg: &Message) -> anyhow::Result<()> {
        ctx.outbox().pong(msg.arg(0).unwrap_or_default())?;
        Ok(())
    }
}

/// Joins the configured channels once the server accepts registration.
///
/// Bound to the registration-complete numerics. Every trigger joins the whole
/// list again; servers ignore a JOIN for a channel the client is already in.
pub struct JoinChannelsHook {
    channels: Vec<String>,
}

impl JoinChannelsHook {
    pub fn new(channels: Vec<String>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl Hook for JoinChannelsHook {
    async fn handle(&self, ctx: &HookContext, msg: &Message) -> anyhow::Result<()> {
        ctx.set_state(SessionState::Registered);
        info!(trigger = %msg.command, channels = self.channels.len(), "registered, joining channels");

        for channel in &self.channels {
            ctx.outbox().join(channel)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::test_support::{context, drain};

    #[tokio::test]
    async fn test_ping_echoes_token() {
        let (ctx, mut rx) = context();

        PingHook
            .handle(&ctx, &"PING :irc.example.net".parse().unwrap())
            .await
            .unwrap();
        PingHook
            .handle(&ctx, &"PING 12345".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(drain(&mut rx), ["PONG :irc.example.net", "PONG :12345"]);
    }

    #[tokio::test]
    async fn test_join_channels_in_order_and_mark_registered() {
        let (ctx, mut rx) = context();
        let hook = JoinChannelsHook::new(vec!["#a".to_string(), "#b".to_string()]);

        hook.handle(&ctx, &":irc.test 001 kaa :Welcome".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(drain(&mut rx), ["JOIN #a", "JOIN #b"]);
        assert_eq!(ctx.state(), SessionState::Registered);
    }

    #[tokio::test]
    async fn test_join_repeats_on_second_trigger() {
        let (ctx, mut rx) = context();
        let hook = JoinChannelsHook::new(vec!["#a".to_string()]);

        hook.handle(&ctx, &":irc.test 001 kaa :Welcome".parse().unwrap())
            .await
            .unwrap();
        hook.handle(&ctx, &":irc.test 376 kaa :End of MOTD".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(drain(&mut rx), ["JOIN #a", "JOIN #a"]);
    }

    #[tokio::test]
    async fn test_closed_outbox_is_an_error() {
        let (ctx, rx) = context();
        drop(rx);

        let result = PingHook.handle(&ctx, &"PING :x".parse().unwrap()).await;
        assert!(result.is_err());
    }
}
