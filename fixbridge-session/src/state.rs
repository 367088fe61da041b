/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Session state machine.
//!
//! The engine moves through
//! `Disconnected -> Connecting -> AwaitingLogonReply -> Connected -> ClosingDown -> Disconnected`
//! by feeding [`SessionEvent`]s to [`SessionState::transition`]. Any pair not
//! listed in the transition table is an error, so an order cannot be placed
//! while the session is anywhere but `Connected`.

use fixbridge_core::error::SessionError;
use std::fmt;

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No transport.
    #[default]
    Disconnected,
    /// TCP connect and TLS handshake in progress.
    Connecting,
    /// Logon sent, waiting for the venue's answer.
    AwaitingLogonReply,
    /// Logged on.
    Connected,
    /// Logout being sent and transport being torn down.
    ClosingDown,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A connect attempt starts.
    Dial,
    /// Transport is up and Logon has been written.
    LogonSent,
    /// The venue answered Logon with Logon.
    LogonAccepted,
    /// The attempt or the live session failed (timeout, Logout, Reject, I/O).
    Failed,
    /// Local close requested.
    Close,
    /// Transport fully torn down.
    Closed,
}

impl SessionState {
    /// Applies `event` and returns the next state.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidTransition` for any pair outside the
    /// transition table.
    pub fn transition(self, event: SessionEvent) -> Result<Self, SessionError> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Disconnected, E::Dial) => Ok(S::Connecting),
            (S::Connecting, E::LogonSent) => Ok(S::AwaitingLogonReply),
            (S::AwaitingLogonReply, E::LogonAccepted) => Ok(S::Connected),
            (S::Connecting | S::AwaitingLogonReply | S::Connected, E::Failed) => {
                Ok(S::Disconnected)
            }
            (S::Connecting | S::AwaitingLogonReply | S::Connected, E::Close) => Ok(S::ClosingDown),
            (S::ClosingDown, E::Closed | E::Failed) => Ok(S::Disconnected),
            (state, event) => Err(SessionError::InvalidTransition {
                state: state.name(),
                event: event.name(),
            }),
        }
    }

    /// Returns true if the session is logged on.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingLogonReply => "awaiting logon reply",
            Self::Connected => "connected",
            Self::ClosingDown => "closing down",
        }
    }
}

impl SessionEvent {
    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dial => "dial",
            Self::LogonSent => "logon sent",
            Self::LogonAccepted => "logon accepted",
            Self::Failed => "failure",
            Self::Close => "close",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
