//! kaa - a small hook-driven IRC bot.
//!
//! The crate keeps one server connection alive through a [`Session`]:
//! it registers with the server, answers keepalive pings, joins the
//! configured channels, and routes every inbound message to the
//! [`Hook`] registered for its command.
//!
//! ```no_run
//! use kaa::config::Config;
//! use kaa::hooks::{HookContext, hook_fn};
//! use kaa::kaa_proto::Message;
//! use kaa::session::Session;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load("kaa.toml")?;
//! let mut session = Session::new(&config);
//!
//! session.register("privmsg", hook_fn(|ctx: HookContext, msg: Message| async move {
//!     if msg.trailing() == "!ping" {
//!         if let Some(target) = msg.response_target() {
//!             ctx.outbox().privmsg(target, "pong")?;
//!         }
//!     }
//!     Ok::<_, anyhow::Error>(())
//! }));
//!
//! session.connect().await?;
//! session.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod hooks;
pub mod session;
pub mod telemetry;

pub use kaa_proto;

pub use error::{HookError, OutboxClosed, SessionError};
pub use hooks::{Hook, HookContext, HookRegistry};
pub use session::{Outbox, Session, SessionState};
