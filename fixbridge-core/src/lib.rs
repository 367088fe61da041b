/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # fixbridge Core
//!
//! Core types and error definitions shared by every fixbridge crate.
//!
//! This crate provides:
//! - **Error types**: the decode, session and connector error taxonomy
//! - **Field types**: [`FieldRef`], a borrowed view of one `tag=value` pair
//! - **Message types**: [`MsgType`] for inbound traffic and [`OutboundMsgType`],
//!   the closed set of messages the bridge is allowed to send
//! - **Core types**: [`SeqNum`], [`Timestamp`], [`Side`], [`OrdType`], [`Secret`]
//! - **Tags**: numeric constants for the FIX 4.2 subset in use

pub mod error;
pub mod field;
pub mod message;
pub mod tags;
pub mod types;

pub use error::{ConnectorError, DecodeError, Result, SessionError};
pub use field::FieldRef;
pub use message::{MsgType, OutboundMsgType};
pub use types::{OrdType, Secret, SeqNum, Side, Timestamp};
