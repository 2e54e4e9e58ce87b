//! Client-side TLS setup.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::warn;

use super::error::ConnectionError;

/// Load the platform trust anchors.
fn native_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!(error = ?e, "failed to load native root certificates");
    }
    roots
}

/// Upgrade a connected TCP stream to TLS, verifying `host` against the
/// platform root store.
pub(crate) async fn upgrade(
    stream: TcpStream,
    host: &str,
) -> Result<TlsStream<TcpStream>, ConnectionError> {
    let config = ClientConfig::builder()
        .with_root_certificates(native_roots())
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(config));

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| ConnectionError::InvalidServerName(host.to_string()))?;

    connector
        .connect(server_name, stream)
        .await
        .map_err(|source| ConnectionError::Tls {
            host: host.to_string(),
            source,
        })
}
