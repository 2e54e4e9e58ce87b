//! IRC client transport.
//!
//! A [`Transport`] owns one socket (plain TCP or client TLS) and runs two
//! tasks over it for the lifetime of the connection:
//!
//! - the receive loop frames inbound bytes with [`LineCodec`] and pushes each
//!   complete line onto the inbound queue, in arrival order;
//! - the send loop pops lines from the outbound queue and writes each one
//!   completely, terminator included, before taking the next.
//!
//! When either loop stops the other follows, and the inbound queue closes.
//!
//! ```ignore
//! use kaa_proto::transport::{Endpoint, Security, Transport};
//!
//! let endpoint = Endpoint::new("irc.libera.chat", 6697, Security::Tls);
//! let mut transport = Transport::connect(&endpoint).await?;
//! let mut inbound = transport.take_inbound().unwrap();
//! transport.sender().send("NICK kaa".to_string())?;
//! while let Some(line) = inbound.recv().await {
//!     println!("{line}");
//! }
//! let reason = transport.disconnect().await;
//! ```
//!
//! [`LineCodec`]: crate::line::LineCodec

mod error;
mod tls;

use std::io;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::line::{LineCodec, MAX_OUTBOUND_LEN};

pub use error::{ConnectionError, TransportClosed};

/// Default idle timeout: the connection is considered dead after this long
/// without a single inbound byte.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Whether the socket is wrapped in TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// Plain TCP.
    #[default]
    Plain,
    /// TLS verified against the platform root store.
    Tls,
}

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Plain or TLS.
    pub security: Security,
    /// Close the connection when nothing arrives for this long.
    pub idle_timeout: Option<Duration>,
}

impl Endpoint {
    /// Create an endpoint with the default idle timeout.
    pub fn new(host: impl Into<String>, port: u16, security: Security) -> Self {
        Self {
            host: host.into(),
            port,
            security,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }

    /// Replace the idle timeout. `None` disables it.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// `host:port`, for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A running connection, exposed as an inbound line queue and an outbound
/// line sink.
///
/// Dropping the transport stops both loops and closes the socket.
pub struct Transport {
    inbound: Option<mpsc::UnboundedReceiver<String>>,
    outbound: mpsc::UnboundedSender<String>,
    shutdown: CancellationToken,
    recv_task: Option<JoinHandle<Result<(), TransportClosed>>>,
    send_task: Option<JoinHandle<Result<(), TransportClosed>>>,
    tls: bool,
}

impl Transport {
    /// Connect to `endpoint` and start the receive and send loops.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] when the socket cannot be opened or the
    /// TLS handshake fails.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, ConnectionError> {
        let addr = endpoint.address();
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|source| ConnectionError::Io {
                addr: addr.clone(),
                source,
            })?;

        if let Err(e) = enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        match endpoint.security {
            Security::Plain => {
                info!(%addr, "connected");
                Ok(Self::spawn(stream, endpoint.idle_timeout))
            }
            Security::Tls => {
                let stream = tls::upgrade(stream, &endpoint.host).await?;
                info!(%addr, "connected with TLS");
                let mut transport = Self::spawn(stream, endpoint.idle_timeout);
                transport.tls = true;
                Ok(transport)
            }
        }
    }

    /// Run the receive and send loops over an already-connected stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(stream: S, idle_timeout: Option<Duration>) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let recv_task = tokio::spawn(recv_loop(
            FramedRead::new(reader, LineCodec::new()),
            inbound_tx,
            idle_timeout,
            shutdown.clone(),
        ));
        let send_task = tokio::spawn(send_loop(
            FramedWrite::new(writer, LineCodec::new()),
            outbound_rx,
            shutdown.clone(),
        ));

        Self {
            inbound: Some(inbound_rx),
            outbound: outbound_tx,
            shutdown,
            recv_task: Some(recv_task),
            send_task: Some(send_task),
            tls: false,
        }
    }

    /// Hand the inbound queue to its single consumer.
    ///
    /// Returns `None` once it has been taken.
    pub fn take_inbound(&mut self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.inbound.take()
    }

    /// A producer handle for the outbound queue.
    ///
    /// Sending fails once the send loop has stopped.
    pub fn sender(&self) -> mpsc::UnboundedSender<String> {
        self.outbound.clone()
    }

    /// Check if this transport uses TLS.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Whether either loop has stopped or a disconnect was requested.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop both loops and close the socket.
    ///
    /// Lines still queued for sending are dropped. Returns the failure that
    /// ended a loop on its own, or `Ok(())` if the loops were still healthy.
    /// Calling it again returns `Ok(())`.
    pub async fn disconnect(&mut self) -> Result<(), TransportClosed> {
        self.shutdown.cancel();

        let mut first_error = None;
        for task in [self.recv_task.take(), self.send_task.take()]
            .into_iter()
            .flatten()
        {
            let result = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(TransportClosed::Io(io::Error::other(join_err))),
            };
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

async fn read_line<R>(
    lines: &mut FramedRead<R, LineCodec>,
    idle_timeout: Option<Duration>,
) -> Result<Option<String>, TransportClosed>
where
    R: AsyncRead + Unpin,
{
    let next = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, lines.next())
            .await
            .map_err(|_| TransportClosed::Idle(limit))?,
        None => lines.next().await,
    };
    next.transpose().map_err(TransportClosed::from)
}

async fn recv_loop<R>(
    mut lines: FramedRead<R, LineCodec>,
    inbound: mpsc::UnboundedSender<String>,
    idle_timeout: Option<Duration>,
    shutdown: CancellationToken,
) -> Result<(), TransportClosed>
where
    R: AsyncRead + Unpin,
{
    let _stop_sender = shutdown.clone().drop_guard();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            line = read_line(&mut lines, idle_timeout) => line?,
        };

        let Some(line) = line else {
            debug!("end of stream");
            return Err(TransportClosed::Eof);
        };

        debug!(%line, "recv");
        if inbound.send(line).is_err() {
            debug!("inbound queue dropped, stopping receive loop");
            return Ok(());
        }
    }
}

async fn send_loop<W>(
    mut sink: FramedWrite<W, LineCodec>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    shutdown: CancellationToken,
) -> Result<(), TransportClosed>
where
    W: AsyncWrite + Unpin,
{
    let _stop_receiver = shutdown.clone().drop_guard();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            line = outbound.recv() => match line {
                Some(line) => line,
                None => return Ok(()),
            },
        };

        debug!(line = %LineCodec::sanitize(&line, MAX_OUTBOUND_LEN), "send");

        // `send` encodes the whole line into the write buffer, then flushes it.
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            result = sink.send(line) => result?,
        }
    }
}
