//! Transport error types.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while opening a connection.
///
/// Fatal to that connect attempt; retrying is up to the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// The TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Io {
        /// `host:port` that was dialed.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// The host is not usable as a TLS server name.
    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// The TLS handshake failed.
    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        /// Server name used for verification.
        host: String,
        /// Underlying handshake error.
        #[source]
        source: io::Error,
    },
}

/// Reasons a live connection stopped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportClosed {
    /// The server closed the connection.
    #[error("connection closed by peer")]
    Eof,

    /// Reading from or writing to the socket failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    /// Nothing was received within the idle timeout.
    #[error("no data received for {0:?}")]
    Idle(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset");
        let closed: TransportClosed = io_err.into();

        assert!(matches!(closed, TransportClosed::Io(_)));
        assert_eq!(closed.to_string(), "transport I/O error: connection reset");
    }

    #[test]
    fn test_error_source_chaining() {
        let err = ConnectionError::Io {
            addr: "127.0.0.1:6667".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };

        let source = std::error::Error::source(&err);
        assert_eq!(source.unwrap().to_string(), "refused");
        assert_eq!(err.to_string(), "failed to connect to 127.0.0.1:6667: refused");
    }

    #[test]
    fn test_idle_display() {
        let closed = TransportClosed::Idle(Duration::from_secs(300));
        assert_eq!(closed.to_string(), "no data received for 300s");
    }
}
