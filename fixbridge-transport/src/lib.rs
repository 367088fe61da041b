/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # fixbridge Transport
//!
//! Network transport layer for the fixbridge FIX session.
//!
//! This crate provides:
//! - **Codec**: Tokio codec for FIX message framing
//! - **Framed stream**: [`FixStream`], send and receive whole frames over
//!   any `AsyncRead + AsyncWrite` transport
//! - **TLS support**: venue connections through rustls

pub mod codec;
pub mod stream;
pub mod tls;

pub use codec::{CodecError, FixCodec};
pub use stream::FixStream;
pub use tls::{TlsStream, connect_tls};
