//! Hook registry and dispatch.
//!
//! Lookups lower-case the incoming command, so `PING`, `Ping` and `ping`
//! all reach the hook registered under `ping`. Registering a command that
//! already has a hook replaces it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kaa_proto::Message;
use parking_lot::RwLock;
use tokio_util::task::AbortOnDropHandle;
use tracing::{Instrument, debug, trace};

use super::{Hook, HookContext};
use crate::error::HookError;
use crate::telemetry::spans;

/// Deadline applied to hooks registered without one.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A hook ran to completion.
    Handled,
    /// No hook is registered for the command.
    Unmatched,
}

#[derive(Clone)]
struct HookEntry {
    hook: Arc<dyn Hook>,
    timeout: Option<Duration>,
}

/// Registry of command hooks.
pub struct HookRegistry {
    hooks: RwLock<HashMap<String, HookEntry>>,
    default_timeout: Duration,
}

impl HookRegistry {
    /// Create an empty registry whose hooks run under `default_timeout`.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
            default_timeout,
        }
    }

    /// Register `hook` for `command` under the default deadline.
    pub fn register<H: Hook>(&self, command: &str, hook: H) {
        self.insert(command, Arc::new(hook), None);
    }

    /// Register `hook` for `command` with its own deadline.
    pub fn register_with_timeout<H: Hook>(&self, command: &str, hook: H, timeout: Duration) {
        self.insert(command, Arc::new(hook), Some(timeout));
    }

    /// Register an already shared hook.
    pub fn register_shared(&self, command: &str, hook: Arc<dyn Hook>) {
        self.insert(command, hook, None);
    }

    /// Remove the hook for `command`. Returns whether one was registered.
    pub fn unregister(&self, command: &str) -> bool {
        self.hooks
            .write()
            .remove(&command.to_ascii_lowercase())
            .is_some()
    }

    /// Whether a hook is registered for `command`.
    pub fn contains(&self, command: &str) -> bool {
        self.hooks.read().contains_key(&command.to_ascii_lowercase())
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<String> {
        let mut commands: Vec<String> = self.hooks.read().keys().cloned().collect();
        commands.sort_unstable();
        commands
    }

    fn insert(&self, command: &str, hook: Arc<dyn Hook>, timeout: Option<Duration>) {
        let key = command.to_ascii_lowercase();
        if self
            .hooks
            .write()
            .insert(key.clone(), HookEntry { hook, timeout })
            .is_some()
        {
            debug!(command = %key, "replaced hook");
        }
    }

    /// Run the hook registered for `msg.command`, if any.
    ///
    /// The hook runs as its own task. When its deadline passes the task is
    /// aborted and [`HookError::Timeout`] is returned; a panic inside the hook
    /// is reported as [`HookError::Panicked`]. Neither affects later
    /// dispatches. Dropping the returned future also aborts the hook.
    pub async fn dispatch(&self, ctx: &HookContext, msg: &Message) -> Result<Dispatch, HookError> {
        let command = msg.command.to_ascii_lowercase();

        // Clone out of the lock; it must not be held while the hook runs.
        let entry = self.hooks.read().get(&command).cloned();
        let Some(entry) = entry else {
            trace!(command = %command, "no hook registered");
            return Ok(Dispatch::Unmatched);
        };

        let timeout = entry.timeout.unwrap_or(self.default_timeout);
        let span = spans::hook(&command, msg.source_nick());
        let hook = entry.hook;
        let task_ctx = ctx.clone();
        let task_msg = msg.clone();

        let mut task = AbortOnDropHandle::new(tokio::spawn(
            async move { hook.handle(&task_ctx, &task_msg).await }.instrument(span),
        ));

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(Ok(()))) => Ok(Dispatch::Handled),
            Ok(Ok(Err(source))) => Err(HookError::Failed { command, source }),
            Ok(Err(join_err)) if join_err.is_panic() => Err(HookError::Panicked { command }),
            Ok(Err(join_err)) => Err(HookError::Failed {
                command,
                source: anyhow::Error::new(join_err),
            }),
            Err(_elapsed) => {
                task.abort();
                Err(HookError::Timeout { command, timeout })
            }
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_HOOK_TIMEOUT)
    }
}
