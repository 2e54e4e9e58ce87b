//! Message hooks.
//!
//! A hook is an async handler bound to one command name. The
//! [`HookRegistry`] maps lower-cased command names to hooks and runs the
//! matching hook for every inbound [`Message`], each invocation bounded by a
//! deadline.
//!
//! ```ignore
//! session.register("privmsg", hook_fn(|ctx: HookContext, msg: Message| async move {
//!     if let Some(target) = msg.response_target() {
//!         ctx.outbox().privmsg(target, msg.trailing())?;
//!     }
//!     Ok(())
//! }));
//! ```

mod builtin;
mod registry;

pub use builtin::{JoinChannelsHook, PingHook};
pub use registry::{DEFAULT_HOOK_TIMEOUT, Dispatch, HookRegistry};

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use kaa_proto::Message;
use tokio::sync::watch;

use crate::session::{self, Outbox, SessionState};

/// Handler for one command.
///
/// Implementations must be cheap to share: the registry keeps them behind an
/// `Arc` and runs each invocation as its own task.
#[async_trait]
pub trait Hook: Send + Sync + 'static {
    /// Handle a message whose command matched this hook's key.
    ///
    /// An error is logged by the dispatch loop and affects only this message.
    async fn handle(&self, ctx: &HookContext, msg: &Message) -> anyhow::Result<()>;
}

/// What a hook may touch while it runs.
#[derive(Clone)]
pub struct HookContext {
    outbox: Outbox,
    state: Arc<watch::Sender<SessionState>>,
}

impl HookContext {
    pub fn new(outbox: Outbox, state: Arc<watch::Sender<SessionState>>) -> Self {
        Self { outbox, state }
    }

    /// Queue for outbound lines on the current connection.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Move the session to `state`, notifying watchers on change.
    pub fn set_state(&self, state: SessionState) {
        session::transition(&self.state, state);
    }
}

/// Adapter turning an async closure into a [`Hook`].
///
/// The closure receives owned copies of the context and message so the
/// returned future can be `'static`.
pub struct FnHook<F>(F);

/// Wrap an async closure as a [`Hook`].
pub fn hook_fn<F, Fut>(f: F) -> FnHook<F>
where
    F: Fn(HookContext, Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnHook(f)
}

#[async_trait]
impl<F, Fut> Hook for FnHook<F>
where
    F: Fn(HookContext, Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, ctx: &HookContext, msg: &Message) -> anyhow::Result<()> {
        (self.0)(ctx.clone(), msg.clone()).await
    }
}
