/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Session configuration.
//!
//! Holds everything a connector needs to reach the venue: endpoint,
//! session identifiers, credentials and the bounds on every network wait.

use fixbridge_core::error::ConnectorError;
use fixbridge_core::types::Secret;
use fixbridge_tagvalue::encoder::Header;
use std::time::Duration;

/// FIX version spoken on the wire.
pub const BEGIN_STRING: &str = "FIX.4.2";

/// Configuration for a venue session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Venue host name, also used for TLS SNI.
    pub host: String,
    /// Venue port.
    pub port: u16,
    /// Login user name (tag 553).
    pub username: String,
    /// Login password (tag 554).
    pub password: Secret,
    /// License key sent as RawData (tag 96) when set.
    pub license_key: Secret,
    /// Whether CONNECT must fail when no license key is configured.
    pub license_required: bool,
    /// Sender CompID (tag 49). Falls back to `username` when empty.
    pub sender_comp_id: String,
    /// Target CompID (tag 56).
    pub target_comp_id: String,
    /// Sender SubID (tag 50), omitted when empty.
    pub sender_sub_id: String,
    /// Target SubID (tag 57), omitted when empty.
    pub target_sub_id: String,
    /// Heartbeat interval advertised in Logon (tag 108).
    pub heartbeat_interval: Duration,
    /// Bound on the TCP connect and TLS handshake together.
    pub connect_timeout: Duration,
    /// Overall bound on the Logon exchange.
    pub logon_timeout: Duration,
    /// Bound on the TestRequest round trip.
    pub ping_timeout: Duration,
    /// How long to wait for an ExecutionReport after a NewOrderSingle.
    pub ack_timeout: Duration,
    /// Bound on sending Logout during close.
    pub logout_timeout: Duration,
}

impl SessionConfig {
    /// Creates a configuration for `host:port` with venue defaults.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: String::new(),
            password: Secret::default(),
            license_key: Secret::default(),
            license_required: false,
            sender_comp_id: String::new(),
            target_comp_id: "CTS".to_string(),
            sender_sub_id: String::new(),
            target_sub_id: "T4FIX".to_string(),
            heartbeat_interval: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(15),
            logon_timeout: Duration::from_secs(15),
            ping_timeout: Duration::from_secs(10),
            ack_timeout: Duration::from_secs(2),
            logout_timeout: Duration::from_secs(2),
        }
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: Secret) -> Self {
        self.username = username.into();
        self.password = password;
        self
    }

    /// Sets the license key.
    #[must_use]
    pub fn with_license_key(mut self, license_key: Secret) -> Self {
        self.license_key = license_key;
        self
    }

    /// Sets the sender and target CompIDs.
    #[must_use]
    pub fn with_comp_ids(
        mut self,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        self.sender_comp_id = sender_comp_id.into();
        self.target_comp_id = target_comp_id.into();
        self
    }

    /// Sets the sender and target SubIDs.
    #[must_use]
    pub fn with_sub_ids(
        mut self,
        sender_sub_id: impl Into<String>,
        target_sub_id: impl Into<String>,
    ) -> Self {
        self.sender_sub_id = sender_sub_id.into();
        self.target_sub_id = target_sub_id.into();
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub fn with_logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = timeout;
        self
    }

    /// Sets the ping timeout.
    #[must_use]
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Sets the order acknowledgement wait.
    #[must_use]
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Returns the heartbeat interval in seconds.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }

    /// Returns the effective SenderCompID.
    #[must_use]
    pub fn effective_sender_comp_id(&self) -> &str {
        if self.sender_comp_id.is_empty() {
            &self.username
        } else {
            &self.sender_comp_id
        }
    }

    /// Returns the header stamped on every outbound message.
    #[must_use]
    pub fn header(&self) -> Header<'_> {
        Header {
            begin_string: BEGIN_STRING,
            sender_comp_id: self.effective_sender_comp_id(),
            target_comp_id: &self.target_comp_id,
            sender_sub_id: &self.sender_sub_id,
            target_sub_id: &self.target_sub_id,
        }
    }

    /// Checks that the credentials needed for Logon are present.
    ///
    /// # Errors
    /// Returns `ConnectorError::Config` naming the first missing value.
    pub fn validate_credentials(&self) -> Result<(), ConnectorError> {
        if self.username.trim().is_empty() {
            return Err(ConnectorError::Config(
                "FIX username is required (set FIX_USERNAME)".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(ConnectorError::Config(
                "FIX password is required (set FIX_PASSWORD)".to_string(),
            ));
        }
        if self.license_required && self.license_key.is_empty() {
            return Err(ConnectorError::Config(
                "FIX license key is required (set FIX_LICENSE_KEY)".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("uhfix-sim.t4login.com", 10443)
    }
}
