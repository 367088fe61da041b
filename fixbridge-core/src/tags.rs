/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! FIX 4.2 tag numbers used by the bridge.

pub const ACCOUNT: u32 = 1;
pub const BEGIN_STRING: u32 = 8;
pub const BODY_LENGTH: u32 = 9;
pub const CHECKSUM: u32 = 10;
pub const CL_ORD_ID: u32 = 11;
pub const HANDL_INST: u32 = 21;
pub const MSG_SEQ_NUM: u32 = 34;
pub const MSG_TYPE: u32 = 35;
pub const ORDER_ID: u32 = 37;
pub const ORDER_QTY: u32 = 38;
pub const ORD_STATUS: u32 = 39;
pub const ORD_TYPE: u32 = 40;
pub const ORIG_CL_ORD_ID: u32 = 41;
pub const PRICE: u32 = 44;
pub const SENDER_COMP_ID: u32 = 49;
pub const SENDER_SUB_ID: u32 = 50;
pub const SENDING_TIME: u32 = 52;
pub const SIDE: u32 = 54;
pub const SYMBOL: u32 = 55;
pub const TARGET_COMP_ID: u32 = 56;
pub const TARGET_SUB_ID: u32 = 57;
pub const TEXT: u32 = 58;
pub const TRANSACT_TIME: u32 = 60;
pub const RAW_DATA: u32 = 96;
pub const ENCRYPT_METHOD: u32 = 98;
pub const HEART_BT_INT: u32 = 108;
pub const TEST_REQ_ID: u32 = 112;
pub const REF_TAG_ID: u32 = 371;
pub const REF_MSG_TYPE: u32 = 372;
/// Venue extension carried on Logon; not part of standard FIX 4.2.
pub const USERNAME: u32 = 553;
/// Venue extension carried on Logon; not part of standard FIX 4.2.
pub const PASSWORD: u32 = 554;

/// OrdStatus (39) value for a rejected order.
pub const ORD_STATUS_REJECTED: &str = "8";
