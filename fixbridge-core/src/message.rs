/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Message types for the FIX 4.2 subset spoken by the bridge.
//!
//! Inbound traffic is classified with [`MsgType`], which keeps unknown
//! types as `Custom` so they can be logged and skipped. Outbound traffic
//! goes through [`OutboundMsgType`]: a message type that is not listed
//! there cannot be encoded at all.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound FIX message types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Logon (A) - Session level.
    Logon,
    /// Any other message type, kept verbatim.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "3" => Self::Reject,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "A" => Self::Logon,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the wire representation of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::Reject => "3",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::Logon => "A",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The only message types the bridge ever sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundMsgType {
    /// Heartbeat (0).
    Heartbeat,
    /// Test Request (1).
    TestRequest,
    /// Logout (5).
    Logout,
    /// Logon (A).
    Logon,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
}

impl OutboundMsgType {
    /// Returns the wire representation of this message type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::Logout => "5",
            Self::Logon => "A",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
        }
    }
}

impl fmt::Display for OutboundMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_from_str() {
        assert_eq!("0".parse::<MsgType>().unwrap(), MsgType::Heartbeat);
        assert_eq!("A".parse::<MsgType>().unwrap(), MsgType::Logon);
        assert_eq!("3".parse::<MsgType>().unwrap(), MsgType::Reject);
        assert_eq!("8".parse::<MsgType>().unwrap(), MsgType::ExecutionReport);
    }

    #[test]
    fn test_msg_type_custom() {
        let custom: MsgType = "x".parse().unwrap();
        assert!(matches!(custom, MsgType::Custom(_)));
        assert_eq!(custom.as_str(), "x");
    }

    #[test]
    fn test_order_messages_are_not_classified_inbound() {
        let order: MsgType = "D".parse().unwrap();
        assert_eq!(order, MsgType::Custom("D".to_string()));
        assert_eq!(OutboundMsgType::NewOrderSingle.to_string(), "D");
        assert_eq!(OutboundMsgType::OrderCancelRequest.to_string(), "F");
    }
}
