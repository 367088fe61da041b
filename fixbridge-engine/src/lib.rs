/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # fixbridge Engine
//!
//! Venue connectors driven by the fixbridge command server.
//!
//! This crate provides:
//! - **Connector trait**: the operation set every venue connection offers
//! - **FIX connector**: a FIX 4.2 session over TLS with Logon, keep-alive
//!   between commands, order entry and cancel
//! - **Stub connector**: an offline stand-in for smoke tests
//! - **Selection**: [`ConnectorKind`] and [`build_connector`]

pub mod connector;
pub mod factory;
pub mod fix;
pub mod order;
pub mod stub;

pub use connector::{Connector, VenueWork};
pub use factory::{ConnectorKind, build_connector};
pub use fix::{Dialer, FixConnector, TlsDialer};
pub use order::OrderRequest;
pub use stub::StubConnector;
