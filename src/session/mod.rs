//! Connection lifecycle and registration.
//!
//! A [`Session`] owns at most one [`Transport`] at a time and moves through
//!
//! ```text
//! Disconnected -> Connecting -> AwaitingRegistration -> Registered
//!       ^              |                  |                  |
//!       +--------------+------------------+------------------+
//! ```
//!
//! `connect` opens the transport, starts the dispatch loop and sends
//! `NICK`, then `USER` after a short grace period. The registration-complete
//! numerics trigger the built-in join hook, which joins the configured
//! channels and marks the session `Registered`. The session never reconnects
//! on its own; callers decide what to do once [`Session::wait`] returns.

mod dispatch;
mod outbox;

pub use outbox::Outbox;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kaa_proto::{Endpoint, Message, Transport};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};

use crate::config::{Config, IdentityConfig};
use crate::error::SessionError;
use crate::hooks::{Hook, HookContext, HookRegistry, JoinChannelsHook, PingHook};
use crate::telemetry::spans;

/// Capacity of the inbound message broadcast.
const EVENT_CAPACITY: usize = 256;

/// Where a session is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    AwaitingRegistration,
    Registered,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingRegistration => "awaiting_registration",
            Self::Registered => "registered",
        })
    }
}

/// The live parts of one connection.
struct Connection {
    transport: Transport,
    outbox: Outbox,
    dispatcher: JoinHandle<()>,
}

/// One bot identity on one server.
pub struct Session {
    endpoint: Endpoint,
    identity: IdentityConfig,
    registration_grace: Duration,
    registry: Arc<HookRegistry>,
    state: Arc<watch::Sender<SessionState>>,
    events: broadcast::Sender<Message>,
    conn: Option<Connection>,
}

impl Session {
    /// Create a disconnected session with the built-in hooks registered.
    pub fn new(config: &Config) -> Self {
        let registry = Arc::new(HookRegistry::new(config.session.hook_timeout()));

        registry.register("ping", PingHook);
        let join: Arc<dyn Hook> = Arc::new(JoinChannelsHook::new(config.session.channels.clone()));
        for command in &config.session.join_on {
            registry.register_shared(command, join.clone());
        }

        let (state, _) = watch::channel(SessionState::Disconnected);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            endpoint: config.server.endpoint(),
            identity: config.identity.clone(),
            registration_grace: config.session.registration_grace(),
            registry,
            state: Arc::new(state),
            events,
            conn: None,
        }
    }

    /// Connect and start registration.
    ///
    /// Returns once `USER` has been queued. Registration completes later,
    /// when the server sends a registration-complete numeric.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyConnected`] if a connection is open
    /// - [`SessionError::Connection`] if the transport cannot be opened
    /// - [`SessionError::Closed`] if the server drops the connection during
    ///   the registration grace period
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.conn.is_some() {
            return Err(SessionError::AlreadyConnected);
        }

        self.set_state(SessionState::Connecting);
        let mut transport = match Transport::connect(&self.endpoint).await {
            Ok(transport) => transport,
            Err(e) => {
                warn!(addr = %self.endpoint.address(), error = %e, "connection failed");
                self.set_state(SessionState::Disconnected);
                return Err(e.into());
            }
        };
        self.set_state(SessionState::AwaitingRegistration);

        let Some(inbound) = transport.take_inbound() else {
            self.set_state(SessionState::Disconnected);
            return Err(SessionError::NotConnected);
        };
        let outbox = Outbox::new(transport.sender());
        let ctx = HookContext::new(outbox.clone(), self.state.clone());
        let span = spans::connection(&self.endpoint.address(), &self.identity.nick);
        let dispatcher = tokio::spawn(
            dispatch::run(inbound, self.registry.clone(), ctx, self.events.clone()).instrument(span),
        );

        self.conn = Some(Connection {
            transport,
            outbox: outbox.clone(),
            dispatcher,
        });

        if let Err(e) = self.send_registration(&outbox).await {
            return Err(self.teardown().await.err().unwrap_or(e));
        }
        Ok(())
    }

    async fn send_registration(&self, outbox: &Outbox) -> Result<(), SessionError> {
        outbox.nick(&self.identity.nick)?;
        tokio::time::sleep(self.registration_grace).await;
        outbox.user(self.identity.user(), &self.identity.realname)?;
        Ok(())
    }

    /// Wait for the current connection to end.
    ///
    /// Returns [`SessionError::Closed`] with the reason the transport
    /// stopped. The session is `Disconnected` afterwards and may connect
    /// again. Cancelling the returned future leaves the connection open.
    pub async fn wait(&mut self) -> Result<(), SessionError> {
        let conn = self.conn.as_mut().ok_or(SessionError::NotConnected)?;
        if let Err(e) = (&mut conn.dispatcher).await {
            error!(error = %e, "dispatch loop ended abnormally");
        }
        self.teardown().await
    }

    /// Close the connection, dropping any lines not yet sent.
    ///
    /// Returns the failure that had already closed the transport, if any.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.conn.is_none() {
            return Ok(());
        }
        info!(addr = %self.endpoint.address(), "disconnecting");
        self.teardown().await
    }

    async fn teardown(&mut self) -> Result<(), SessionError> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };

        let closed = conn.transport.disconnect().await;
        conn.dispatcher.abort();
        self.set_state(SessionState::Disconnected);

        match closed {
            Ok(()) => Ok(()),
            Err(reason) => {
                info!(addr = %self.endpoint.address(), reason = %reason, "connection closed");
                Err(reason.into())
            }
        }
    }

    /// Queue `command` with `args` on the current connection.
    pub fn send<S: AsRef<str>>(
        &self,
        command: &str,
        args: &[S],
        trailing: bool,
    ) -> Result<(), SessionError> {
        Ok(self.outbox()?.command(command, args, trailing)?)
    }

    /// Queue a preformatted line on the current connection.
    pub fn send_raw(&self, line: impl Into<String>) -> Result<(), SessionError> {
        Ok(self.outbox()?.send_raw(line)?)
    }

    /// Queue a `JOIN` for `channel`.
    pub fn join(&self, channel: &str) -> Result<(), SessionError> {
        Ok(self.outbox()?.join(channel)?)
    }

    /// Queue a `PRIVMSG` to `target`.
    pub fn privmsg(&self, target: &str, text: &str) -> Result<(), SessionError> {
        Ok(self.outbox()?.privmsg(target, text)?)
    }

    /// Request a nick change. The server confirms it with a NICK message.
    pub fn set_nick(&self, nick: &str) -> Result<(), SessionError> {
        Ok(self.outbox()?.nick(nick)?)
    }

    /// Outbound queue of the current connection.
    pub fn outbox(&self) -> Result<&Outbox, SessionError> {
        self.conn
            .as_ref()
            .map(|conn| &conn.outbox)
            .ok_or(SessionError::NotConnected)
    }

    /// Register `hook` for `command`, replacing any existing hook.
    ///
    /// Takes effect for the next dispatched message, also while connected.
    pub fn register<H: Hook>(&self, command: &str, hook: H) {
        self.registry.register(command, hook);
    }

    /// Register `hook` for `command` with its own deadline.
    pub fn register_with_timeout<H: Hook>(&self, command: &str, hook: H, timeout: Duration) {
        self.registry.register_with_timeout(command, hook, timeout);
    }

    /// The hook registry shared with the dispatch loop.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Receive every parsed inbound message, hooked or not.
    ///
    /// A subscriber that falls more than a few hundred messages behind
    /// skips the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn set_state(&self, state: SessionState) {
        transition(&self.state, state);
    }
}

/// Publish `next`, logging real changes.
pub(crate) fn transition(state: &watch::Sender<SessionState>, next: SessionState) {
    let previous = state.send_replace(next);
    if previous != next {
        info!(from = %previous, to = %next, "session state changed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.dispatcher.abort();
        }
    }
}
