//! # kaa-proto
//!
//! Wire-level building blocks for the kaa IRC bot: framing a byte stream into
//! protocol lines, parsing lines into [`Message`] values, and running a
//! plain or TLS client connection as a pair of line queues.
//!
//! ## Parsing
//!
//! ```rust
//! use kaa_proto::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #rust :hello there".parse().unwrap();
//! assert_eq!(msg.command, "privmsg");
//! assert_eq!(msg.source_nick(), Some("nick"));
//! assert_eq!(msg.params, ["#rust", "hello there"]);
//! assert_eq!(msg.trailing(), "hello there");
//! ```
//!
//! ## Building outbound lines
//!
//! ```rust
//! use kaa_proto::format_command;
//!
//! assert_eq!(format_command("JOIN", &["#room"], false), "JOIN #room");
//! assert_eq!(
//!     format_command("PRIVMSG", &["#room", "hi all"], true),
//!     "PRIVMSG #room :hi all"
//! );
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::error::ParseError;
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_INBOUND_LEN, MAX_OUTBOUND_LEN};
pub use self::message::{format_command, Message};
#[cfg(feature = "tokio")]
pub use self::transport::{ConnectionError, Endpoint, Security, Transport, TransportClosed};
