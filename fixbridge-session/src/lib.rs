/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # fixbridge Session
//!
//! Session-layer building blocks for the fixbridge FIX engine.
//!
//! This crate provides:
//! - **Configuration**: [`SessionConfig`], venue endpoint, identifiers,
//!   credentials and wait bounds
//! - **Sequencing**: [`SequenceManager`] for outbound MsgSeqNum
//! - **State machine**: [`SessionState`] with an explicit transition function
//! - **Inbound classification**: [`Inbound`]
//! - **Identifiers**: ClOrdID and TestReqID generation

pub mod config;
pub mod ids;
pub mod inbound;
pub mod sequence;
pub mod state;

pub use config::{BEGIN_STRING, SessionConfig};
pub use ids::{IdGenerator, generate_cl_ord_id, generate_test_req_id};
pub use inbound::Inbound;
pub use sequence::SequenceManager;
pub use state::{SessionEvent, SessionState};
