/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # fixbridge Tag-Value
//!
//! FIX tag=value encoding and decoding for the bridge.
//!
//! This crate provides serialization of outbound FIX messages using the
//! standard tag=value format with SOH (0x01) delimiters, and lookups of
//! individual fields in inbound messages.
//!
//! ## Features
//!
//! - **Computed framing**: BodyLength (9) and CheckSum (10) are always
//!   computed by [`encode_message`], never supplied by callers
//! - **Fixed header order**: 8, 9, 35, 49, 56, optional 50/57, 34, 52
//! - **Tolerant lookups**: [`decode_field`] returns `None` for absent tags
//!   and for malformed input instead of failing
//! - **Fast search**: uses `memchr` for delimiter and pattern search

pub mod checksum;
pub mod decoder;
pub mod encoder;

pub use checksum::calculate_checksum;
pub use decoder::{Decoder, decode_field, decode_fields};
pub use encoder::{Encoder, Header, SOH, encode_message};
