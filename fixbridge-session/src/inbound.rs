/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Classification of inbound venue messages.
//!
//! Every wait loop in the engine reads a frame, classifies it here, and
//! decides from the variant whether to answer, finish, fail or keep waiting.

use fixbridge_core::error::ConnectorError;
use fixbridge_core::message::MsgType;
use fixbridge_core::tags;
use fixbridge_tagvalue::decoder::decode_field;

/// One inbound message reduced to what the engine acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Logon (A).
    Logon,
    /// Heartbeat (0), with TestReqID (112) if it answers a TestRequest.
    Heartbeat {
        /// Echoed TestReqID.
        test_req_id: Option<String>,
    },
    /// TestRequest (1); must be answered with a Heartbeat echoing the id.
    TestRequest {
        /// TestReqID (112), empty if absent.
        test_req_id: String,
    },
    /// Logout (5).
    Logout {
        /// Text (58).
        text: String,
    },
    /// Session-level Reject (3).
    Reject {
        /// Text (58).
        text: String,
        /// RefMsgType (372).
        ref_msg_type: String,
        /// RefTagID (371).
        ref_tag_id: String,
    },
    /// ExecutionReport (8).
    ExecutionReport {
        /// ClOrdID (11) of the order being reported.
        cl_ord_id: Option<String>,
        /// OrderID (37).
        order_id: Option<String>,
        /// OrdStatus (39).
        ord_status: Option<String>,
        /// Text (58).
        text: String,
    },
    /// Anything else, including frames with no MsgType.
    Other(MsgType),
}

impl Inbound {
    /// Classifies a raw frame.
    #[must_use]
    pub fn classify(raw: &[u8]) -> Self {
        let field = |tag| decode_field(raw, tag).unwrap_or_default().to_string();
        let optional = |tag| decode_field(raw, tag).map(str::to_string);

        let Some(wire_type) = decode_field(raw, tags::MSG_TYPE) else {
            return Self::Other(MsgType::Custom(String::new()));
        };
        let msg_type: MsgType = wire_type.parse().unwrap_or_else(|never| match never {});

        match msg_type {
            MsgType::Logon => Self::Logon,
            MsgType::Heartbeat => Self::Heartbeat {
                test_req_id: optional(tags::TEST_REQ_ID),
            },
            MsgType::TestRequest => Self::TestRequest {
                test_req_id: field(tags::TEST_REQ_ID),
            },
            MsgType::Logout => Self::Logout {
                text: field(tags::TEXT),
            },
            MsgType::Reject => Self::Reject {
                text: field(tags::TEXT),
                ref_msg_type: field(tags::REF_MSG_TYPE),
                ref_tag_id: field(tags::REF_TAG_ID),
            },
            MsgType::ExecutionReport => Self::ExecutionReport {
                cl_ord_id: optional(tags::CL_ORD_ID),
                order_id: optional(tags::ORDER_ID).filter(|id| !id.is_empty()),
                ord_status: optional(tags::ORD_STATUS),
                text: field(tags::TEXT),
            },
            other => Self::Other(other),
        }
    }

    /// Returns the wire MsgType of this message.
    #[must_use]
    pub fn msg_type(&self) -> MsgType {
        match self {
            Self::Logon => MsgType::Logon,
            Self::Heartbeat { .. } => MsgType::Heartbeat,
            Self::TestRequest { .. } => MsgType::TestRequest,
            Self::Logout { .. } => MsgType::Logout,
            Self::Reject { .. } => MsgType::Reject,
            Self::ExecutionReport { .. } => MsgType::ExecutionReport,
            Self::Other(t) => t.clone(),
        }
    }

    /// Converts a terminal Logout or Reject into the error surfaced to the
    /// caller. Returns `None` for every other variant.
    #[must_use]
    pub fn protocol_error(&self) -> Option<ConnectorError> {
        match self {
            Self::Logout { text } => Some(ConnectorError::Logout { text: text.clone() }),
            Self::Reject {
                text,
                ref_msg_type,
                ref_tag_id,
            } => Some(ConnectorError::Reject {
                text: text.clone(),
                ref_msg_type: ref_msg_type.clone(),
                ref_tag_id: ref_tag_id.clone(),
            }),
            _ => None,
        }
    }
}
