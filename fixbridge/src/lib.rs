/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # fixbridge
//!
//! A local bridge that lets another process on the same host drive a FIX 4.2
//! venue session through a line-oriented command channel.
//!
//! ## Crate Organization
//!
//! - [`core`]: error taxonomy and shared value types
//! - [`tagvalue`]: checksum, encoder and field extraction
//! - [`transport`]: inbound framing and the TLS dialer
//! - [`session`]: session settings, sequence numbers and state machine
//! - [`engine`]: the `Connector` trait with FIX and stub implementations
//! - [`server`]: command parsing, serve loop and response log
//!
//! The binary adds [`cli`], [`config`], [`logging`] and the [`app`] wiring.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;

pub mod core {
    //! Error taxonomy and shared value types.
    pub use fixbridge_core::*;
}

pub mod tagvalue {
    //! Tag=value encoding and decoding.
    pub use fixbridge_tagvalue::*;
}

pub mod transport {
    //! Framing and TLS transport.
    pub use fixbridge_transport::*;
}

pub mod session {
    //! Session settings and state.
    pub use fixbridge_session::*;
}

pub mod engine {
    //! Venue connectors.
    pub use fixbridge_engine::*;
}

pub mod server {
    //! Local command server.
    pub use fixbridge_server::*;
}

/// Commonly used items.
pub mod prelude {
    pub use fixbridge_core::error::{ConnectorError, Result};
    pub use fixbridge_core::types::{OrdType, Secret, Side};
    pub use fixbridge_engine::{Connector, ConnectorKind, OrderRequest, VenueWork, build_connector};
    pub use fixbridge_server::{CommandServer, Endpoint, Listener, ResponseLog};
    pub use fixbridge_session::SessionConfig;
}
