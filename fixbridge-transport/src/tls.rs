/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! TLS client transport.
//!
//! Connections verify the server certificate against the Mozilla root set
//! shipped in `webpki-roots` and negotiate TLS 1.2 or 1.3 only.

use fixbridge_core::error::ConnectorError;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tokio_rustls::TlsConnector;
use tracing::debug;

/// A TLS stream over TCP as returned by [`connect_tls`].
pub type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Builds the client configuration used for every venue connection.
///
/// # Errors
/// Returns `ConnectorError::Transport` if the crypto provider rejects the
/// protocol version set.
pub fn client_config() -> Result<Arc<ClientConfig>, ConnectorError> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])
            .map_err(|e| ConnectorError::Transport(format!("tls setup failed: {e}")))?
            .with_root_certificates(roots)
            .with_no_client_auth();

    Ok(Arc::new(config))
}

/// Opens a TCP connection to `host:port` and completes a TLS handshake,
/// using `host` for SNI and certificate verification.
///
/// `connect_timeout` bounds the TCP connect and the handshake together.
///
/// # Errors
/// Returns `ConnectorError::Config` for a host that is not a valid server
/// name, `ConnectorError::Timeout` if either step is still running when
/// `connect_timeout` expires, and `ConnectorError::Transport` for refused
/// connections and handshake failures.
pub async fn connect_tls(
    host: &str,
    port: u16,
    connect_timeout: Duration,
) -> Result<TlsStream, ConnectorError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| ConnectorError::Config(format!("invalid host name '{host}'")))?;
    let deadline = Instant::now() + connect_timeout;

    let tcp = timeout_at(deadline, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ConnectorError::Timeout("TCP connect".to_string()))?
        .map_err(|e| ConnectorError::Transport(format!("connect to {host}:{port} failed: {e}")))?;
    tcp.set_nodelay(true)?;
    debug!(host, port, "tcp connected");

    let connector = TlsConnector::from(client_config()?);
    let stream = timeout_at(deadline, connector.connect(server_name, tcp))
        .await
        .map_err(|_| ConnectorError::Timeout("TLS handshake".to_string()))?
        .map_err(|e| ConnectorError::Transport(format!("TLS handshake failed: {e}")))?;
    debug!(host, port, "tls established");

    Ok(stream)
}
