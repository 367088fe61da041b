/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Connector selection.

use crate::connector::Connector;
use crate::fix::FixConnector;
use crate::stub::StubConnector;
use fixbridge_core::error::ConnectorError;
use fixbridge_session::SessionConfig;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Which connector implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectorKind {
    /// Offline stub.
    #[default]
    Stub,
    /// FIX 4.2 over TLS.
    Fix,
}

impl ConnectorKind {
    /// Returns the configuration spelling of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::Fix => "fix",
        }
    }
}

impl FromStr for ConnectorKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "stub" => Ok(Self::Stub),
            "fix" => Ok(Self::Fix),
            "real" => Err(ConnectorError::Config(
                "connector 'real' (vendor SDK) is no longer supported; use 'fix'".to_string(),
            )),
            other => Err(ConnectorError::Config(format!(
                "unknown connector '{other}' (expected 'stub' or 'fix')"
            ))),
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the connector selected by `kind`.
#[must_use]
pub fn build_connector(kind: ConnectorKind, config: SessionConfig) -> Box<dyn Connector> {
    info!(connector = %kind, host = %config.host, port = config.port, "connector selected");
    match kind {
        ConnectorKind::Stub => Box::new(StubConnector::new(config)),
        ConnectorKind::Fix => Box::new(FixConnector::new(config)),
    }
}
