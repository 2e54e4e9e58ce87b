//! Per-connection dispatch loop.

use std::sync::Arc;

use kaa_proto::Message;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error};

use super::SessionState;
use crate::hooks::{HookContext, HookRegistry};

/// Parse and dispatch inbound lines until the transport closes the queue.
///
/// Messages are handled one at a time: the next line is taken only after
/// the previous hook finished or hit its deadline.
pub(super) async fn run(
    mut inbound: mpsc::UnboundedReceiver<String>,
    registry: Arc<HookRegistry>,
    ctx: HookContext,
    events: broadcast::Sender<Message>,
) {
    while let Some(line) = inbound.recv().await {
        let msg: Message = match line.parse() {
            Ok(msg) => msg,
            Err(e) => {
                error!(error = %e, line = %line, "failed to parse line");
                continue;
            }
        };

        if events.receiver_count() > 0 {
            // Lagging subscribers lose old messages, dispatch never waits.
            let _ = events.send(msg.clone());
        }

        if let Err(e) = registry.dispatch(&ctx, &msg).await {
            error!(command = %msg.command, kind = e.kind(), error = %e, "hook error");
        }
    }

    debug!("inbound queue closed, dispatch loop stopping");
    ctx.set_state(SessionState::Disconnected);
}
