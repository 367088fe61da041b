/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Error types for the fixbridge engine.
//!
//! Errors are grouped the way the bridge reports them to its caller:
//! configuration, transport, protocol, and local validation. Every
//! `Display` rendering is a single line so it can be sent back verbatim
//! as an `ERROR <reason>` response.

use thiserror::Error;

/// Result type alias using [`ConnectorError`] as the error type.
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Top-level error for every connector operation.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A required setting is missing or invalid. No network I/O was attempted.
    #[error("{0}")]
    Config(String),

    /// The operation needs a logged-on session.
    #[error("not connected")]
    NotConnected,

    /// Connection refused, TLS failure, broken pipe or a framing failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// No reply arrived within the bound for the named exchange.
    #[error("{0} timed out")]
    Timeout(String),

    /// The venue sent a Logout.
    #[error("FIX Logout: {text}")]
    Logout {
        /// Text (58) supplied by the venue.
        text: String,
    },

    /// The venue sent a session-level Reject.
    #[error("FIX Session Reject: {text} (RefMsgType={ref_msg_type} RefTagID={ref_tag_id})")]
    Reject {
        /// Text (58).
        text: String,
        /// RefMsgType (372).
        ref_msg_type: String,
        /// RefTagID (371).
        ref_tag_id: String,
    },

    /// The venue rejected an order through an ExecutionReport.
    #[error("order rejected: {text}")]
    OrderRejected {
        /// Text (58) supplied by the venue.
        text: String,
    },

    /// Local argument validation failed before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// Session state machine error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Inbound message could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<std::io::Error> for ConnectorError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl ConnectorError {
    /// Returns true if this error means the transport can no longer be used.
    #[must_use]
    pub const fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Decode(_) | Self::Logout { .. }
        )
    }
}

/// Errors that occur while framing or decoding inbound FIX messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Invalid BeginString field (tag 8).
    #[error("invalid begin string: expected 8=FIX.x.y")]
    InvalidBeginString,

    /// Missing BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Checksum field is not three decimal digits.
    #[error("invalid checksum format")]
    InvalidChecksum,

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Invalid UTF-8 in string field.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Message exceeds maximum allowed size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Actual message size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },
}

/// Errors in the session state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The event is not legal in the current state.
    #[error("invalid session transition: {event} while {state}")]
    InvalidTransition {
        /// Current session state.
        state: &'static str,
        /// Rejected event.
        event: &'static str,
    },
}
