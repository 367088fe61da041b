/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Command-channel endpoints and listeners.
//!
//! The default endpoint is a Unix domain socket readable only by the owning
//! user. A `tcp:<addr>` endpoint is accepted for hosts without Unix sockets;
//! it must bind a loopback address.

use crate::error::ServerError;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::{UnixListener, UnixStream};

/// Default command socket path.
pub const DEFAULT_ENDPOINT: &str = "/tmp/fixbridge.sock";

const TCP_PREFIX: &str = "tcp:";

/// Where the command server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket path.
    Unix(PathBuf),
    /// Loopback TCP address.
    Tcp(SocketAddr),
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Unix(PathBuf::from(DEFAULT_ENDPOINT))
    }
}

impl FromStr for Endpoint {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ServerError::InvalidEndpoint {
            endpoint: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(invalid("endpoint is empty"));
        }
        match s.strip_prefix(TCP_PREFIX) {
            Some(addr) => {
                let addr: SocketAddr = addr
                    .parse()
                    .map_err(|_| invalid("expected tcp:<ip>:<port>"))?;
                if !addr.ip().is_loopback() {
                    return Err(invalid("tcp endpoints must use a loopback address"));
                }
                Ok(Self::Tcp(addr))
            }
            None => Ok(Self::Unix(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "{}", path.display()),
            Self::Tcp(addr) => write!(f, "{TCP_PREFIX}{addr}"),
        }
    }
}

/// A bound command-channel listener.
#[derive(Debug)]
pub enum Listener {
    /// Unix domain socket listener and the path it owns.
    #[cfg(unix)]
    Unix {
        /// Bound listener.
        listener: UnixListener,
        /// Socket file, removed by [`Listener::cleanup`].
        path: PathBuf,
    },
    /// Loopback TCP listener.
    Tcp(TcpListener),
}

/// One accepted client connection.
#[derive(Debug)]
pub enum Accepted {
    /// Unix socket client.
    #[cfg(unix)]
    Unix(UnixStream),
    /// TCP client and its address.
    Tcp(TcpStream, SocketAddr),
}

impl Listener {
    /// Binds `endpoint`.
    ///
    /// For a Unix endpoint a stale socket file is removed first and the new
    /// socket is restricted to mode `0600`.
    ///
    /// # Errors
    /// Returns `ServerError::InvalidEndpoint` if the path exists and is not a
    /// socket, or `ServerError::Io` if binding fails.
    pub async fn bind(endpoint: &Endpoint) -> Result<Self, ServerError> {
        match endpoint {
            Endpoint::Tcp(addr) => {
                let listener = TcpListener::bind(addr).await?;
                info!(endpoint = %endpoint, "command channel bound");
                Ok(Self::Tcp(listener))
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => {
                use std::os::unix::fs::PermissionsExt;

                remove_stale_socket(path)?;
                let listener = UnixListener::bind(path)?;
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
                info!(endpoint = %endpoint, "command channel bound");
                Ok(Self::Unix {
                    listener,
                    path: path.clone(),
                })
            }
            #[cfg(not(unix))]
            Endpoint::Unix(_) => Err(ServerError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "unix sockets are not available; use tcp:<addr>".to_string(),
            }),
        }
    }

    /// Returns the endpoint actually bound, with the real port for `tcp:…:0`.
    ///
    /// # Errors
    /// Returns an I/O error if the local address cannot be read.
    pub fn local_endpoint(&self) -> io::Result<Endpoint> {
        match self {
            #[cfg(unix)]
            Self::Unix { path, .. } => Ok(Endpoint::Unix(path.clone())),
            Self::Tcp(listener) => listener.local_addr().map(Endpoint::Tcp),
        }
    }

    /// Waits for the next client.
    ///
    /// # Errors
    /// Returns the accept error.
    pub async fn accept(&self) -> io::Result<Accepted> {
        match self {
            #[cfg(unix)]
            Self::Unix { listener, .. } => {
                let (stream, _) = listener.accept().await?;
                Ok(Accepted::Unix(stream))
            }
            Self::Tcp(listener) => {
                let (stream, peer) = listener.accept().await?;
                Ok(Accepted::Tcp(stream, peer))
            }
        }
    }

    /// Removes the socket file of a Unix listener.
    pub fn cleanup(&self) {
        match self {
            #[cfg(unix)]
            Self::Unix { path, .. } => match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "command socket removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove command socket"),
            },
            Self::Tcp(_) => {}
        }
    }
}

#[cfg(unix)]
fn remove_stale_socket(path: &Path) -> Result<(), ServerError> {
    use std::os::unix::fs::FileTypeExt;

    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            std::fs::remove_file(path)?;
            debug!(path = %path.display(), "stale command socket removed");
            Ok(())
        }
        Ok(_) => Err(ServerError::InvalidEndpoint {
            endpoint: path.display().to_string(),
            reason: "path exists and is not a socket".to_string(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints() {
        assert_eq!(
            "/tmp/fixbridge.sock".parse::<Endpoint>().unwrap(),
            Endpoint::default()
        );
        assert_eq!(
            "tcp:127.0.0.1:7001".parse::<Endpoint>().unwrap(),
            Endpoint::Tcp("127.0.0.1:7001".parse().unwrap())
        );
        assert_eq!(
            Endpoint::Tcp("127.0.0.1:7001".parse().unwrap()).to_string(),
            "tcp:127.0.0.1:7001"
        );
    }

    #[test]
    fn test_reject_bad_endpoints() {
        assert!("".parse::<Endpoint>().is_err());
        assert!("tcp:localhost".parse::<Endpoint>().is_err());
        let err = "tcp:0.0.0.0:7001".parse::<Endpoint>().unwrap_err();
        assert!(err.to_string().contains("loopback"));
    }

    #[tokio::test]
    async fn test_bind_tcp_reports_real_port() {
        let endpoint: Endpoint = "tcp:127.0.0.1:0".parse().unwrap();
        let listener = Listener::bind(&endpoint).await.unwrap();
        let Endpoint::Tcp(addr) = listener.local_endpoint().unwrap() else {
            panic!("expected tcp endpoint");
        };
        assert_ne!(addr.port(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bind_unix_replaces_stale_socket_with_private_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.sock");
        let endpoint = Endpoint::Unix(path.clone());

        let first = Listener::bind(&endpoint).await.unwrap();
        drop(first);
        assert!(path.exists());

        let second = Listener::bind(&endpoint).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        second.cleanup();
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bind_unix_refuses_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-socket");
        std::fs::write(&path, b"data").unwrap();

        let err = Listener::bind(&Endpoint::Unix(path.clone())).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidEndpoint { .. }));
        assert!(path.exists());
    }
}
