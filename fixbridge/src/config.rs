/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Bridge configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags. The password and the
//! license key are read from the environment only; the file schema has no
//! field for them and rejects unknown keys.

use anyhow::{Context, Result, bail};
use fixbridge_core::types::Secret;
use fixbridge_engine::ConnectorKind;
use fixbridge_server::{DEFAULT_ENDPOINT, Endpoint};
use fixbridge_session::SessionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default response log location.
pub const DEFAULT_RESPONSE_LOG: &str = "logs/bridge_responses.log";

/// Environment variable holding the FIX password.
pub const ENV_PASSWORD: &str = "FIX_PASSWORD";

/// Environment variable holding the venue license key.
pub const ENV_LICENSE_KEY: &str = "FIX_LICENSE_KEY";

/// Top-level bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Connector name: `stub` or `fix`.
    pub connector: String,
    /// Command endpoint: a socket path or `tcp:<addr>`.
    pub endpoint: String,
    /// Response log path; empty disables the log.
    pub response_log: String,
    /// Seconds a client may stay silent before it is disconnected.
    pub idle_timeout_secs: u64,
    /// Venue session settings.
    pub fix: FixConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            connector: ConnectorKind::default().as_str().to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            response_log: DEFAULT_RESPONSE_LOG.to_string(),
            idle_timeout_secs: 60,
            fix: FixConfig::default(),
        }
    }
}

/// Venue settings without secrets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Falls back to `username` when empty.
    pub sender_comp_id: String,
    pub target_comp_id: String,
    pub sender_sub_id: String,
    pub target_sub_id: String,
    /// HeartBtInt (108) in seconds.
    pub heart_bt_int: u64,
    /// Whether Logon must carry a license key.
    pub license_required: bool,
    pub connect_timeout_secs: u64,
    pub logon_timeout_secs: u64,
    pub ping_timeout_secs: u64,
    pub ack_timeout_secs: u64,
}

impl Default for FixConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            host: session.host,
            port: session.port,
            username: session.username,
            sender_comp_id: session.sender_comp_id,
            target_comp_id: session.target_comp_id,
            sender_sub_id: session.sender_sub_id,
            target_sub_id: session.target_sub_id,
            heart_bt_int: session.heartbeat_interval.as_secs(),
            license_required: session.license_required,
            connect_timeout_secs: session.connect_timeout.as_secs(),
            logon_timeout_secs: session.logon_timeout.as_secs(),
            ping_timeout_secs: session.ping_timeout.as_secs(),
            ack_timeout_secs: session.ack_timeout.as_secs(),
        }
    }
}

impl BridgeConfig {
    /// Reads a TOML file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or does not match the schema.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses TOML text.
    ///
    /// # Errors
    /// Fails on syntax errors and unknown keys.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Unset and empty variables leave the current value alone.
    ///
    /// # Errors
    /// Fails if a numeric variable does not parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BRIDGE_CONNECTOR") {
            self.connector = v;
        }
        if let Some(v) = get("BRIDGE_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = get("BRIDGE_RESPONSE_LOG") {
            self.response_log = v;
        }
        if let Some(v) = get("FIX_HOST") {
            self.fix.host = v;
        }
        if let Some(v) = get("FIX_PORT") {
            self.fix.port = v
                .trim()
                .parse()
                .with_context(|| format!("FIX_PORT must be a port number, got '{v}'"))?;
        }
        if let Some(v) = get("FIX_USERNAME") {
            self.fix.username = v;
        }
        if let Some(v) = get("FIX_SENDER_COMP_ID") {
            self.fix.sender_comp_id = v;
        }
        if let Some(v) = get("FIX_TARGET_COMP_ID") {
            self.fix.target_comp_id = v;
        }
        if let Some(v) = get("FIX_SENDER_SUB_ID") {
            self.fix.sender_sub_id = v;
        }
        if let Some(v) = get("FIX_TARGET_SUB_ID") {
            self.fix.target_sub_id = v;
        }
        if let Some(v) = get("FIX_HEART_BT_INT") {
            self.fix.heart_bt_int = v
                .trim()
                .parse()
                .with_context(|| format!("FIX_HEART_BT_INT must be seconds, got '{v}'"))?;
        }
        Ok(())
    }

    /// Parsed connector kind.
    ///
    /// # Errors
    /// Fails for unknown or retired connector names.
    pub fn connector_kind(&self) -> Result<ConnectorKind> {
        Ok(self.connector.parse()?)
    }

    /// Parsed command endpoint.
    ///
    /// # Errors
    /// Fails if the endpoint is empty or an invalid TCP address.
    pub fn endpoint(&self) -> Result<Endpoint> {
        Ok(self.endpoint.parse()?)
    }

    /// Response log path, or `None` when logging to file is disabled.
    #[must_use]
    pub fn response_log_path(&self) -> Option<PathBuf> {
        let path = self.response_log.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// Client idle window.
    ///
    /// # Errors
    /// Fails if the window is zero, which would drop every client before
    /// its first request.
    pub fn idle_timeout(&self) -> Result<Duration> {
        if self.idle_timeout_secs == 0 {
            bail!("idle_timeout_secs must be greater than zero");
        }
        Ok(Duration::from_secs(self.idle_timeout_secs))
    }

    /// Builds the session configuration, taking secrets from `lookup`.
    ///
    /// Missing credentials are not an error here; CONNECT reports them.
    ///
    /// # Errors
    /// Fails if a timeout or the heartbeat interval is zero.
    pub fn session_config<F>(&self, lookup: F) -> Result<SessionConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fix = &self.fix;
        for (name, value) in [
            ("heart_bt_int", fix.heart_bt_int),
            ("connect_timeout_secs", fix.connect_timeout_secs),
            ("logon_timeout_secs", fix.logon_timeout_secs),
            ("ping_timeout_secs", fix.ping_timeout_secs),
            ("ack_timeout_secs", fix.ack_timeout_secs),
        ] {
            if value == 0 {
                bail!("fix.{name} must be greater than zero");
            }
        }

        let password = Secret::new(lookup(ENV_PASSWORD).unwrap_or_default());
        let license_key = Secret::new(lookup(ENV_LICENSE_KEY).unwrap_or_default());

        let mut session = SessionConfig::new(fix.host.clone(), fix.port)
            .with_credentials(fix.username.clone(), password)
            .with_license_key(license_key)
            .with_comp_ids(fix.sender_comp_id.clone(), fix.target_comp_id.clone())
            .with_sub_ids(fix.sender_sub_id.clone(), fix.target_sub_id.clone())
            .with_heartbeat_interval(Duration::from_secs(fix.heart_bt_int))
            .with_logon_timeout(Duration::from_secs(fix.logon_timeout_secs))
            .with_ping_timeout(Duration::from_secs(fix.ping_timeout_secs))
            .with_ack_timeout(Duration::from_secs(fix.ack_timeout_secs));
        session.connect_timeout = Duration::from_secs(fix.connect_timeout_secs);
        session.license_required = fix.license_required;
        Ok(session)
    }
}
