/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Connector interface.
//!
//! A connector is the single object the command server drives. Every
//! implementation offers the same operation set so the server never needs
//! to know whether it is talking to the venue or to the stub.
//!
//! Between commands the server keeps a live session healthy by racing
//! [`Connector::wait_venue`] against client input and passing whatever it
//! returns to [`Connector::service`].

use crate::order::OrderRequest;
use async_trait::async_trait;
use fixbridge_core::error::Result;
use fixbridge_session::Inbound;

/// Session upkeep found while no command was running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueWork {
    /// Nothing has been sent for a heartbeat interval.
    HeartbeatDue,
    /// The venue sent a message outside any command.
    Received(Inbound),
}

/// Venue operations exposed to the command server.
///
/// Successful calls return the payload that follows `OK ` in the response
/// line. Methods take `&mut self`: a connector is owned by one serving loop
/// and never shared.
#[async_trait]
pub trait Connector: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns true while a session is logged on.
    fn is_connected(&self) -> bool;

    /// Establishes the session using the configuration the connector was
    /// built with.
    async fn connect(&mut self) -> Result<String>;

    /// Round-trips a keep-alive through the venue.
    async fn ping(&mut self) -> Result<String>;

    /// Submits a new order and returns the best identifier available.
    async fn place_order(&mut self, order: &OrderRequest) -> Result<String>;

    /// Sends a cancel request for `symbol`.
    async fn cancel_orders(&mut self, symbol: &str, account: Option<&str>) -> Result<String>;

    /// Ends the session. Calling it on a closed connector does nothing.
    async fn close(&mut self);

    /// Waits until the session needs upkeep.
    ///
    /// Must be cancel safe: the serving loop drops it whenever a client
    /// request or a new connection arrives first. Never returns while no
    /// session is live.
    async fn wait_venue(&mut self) -> Result<VenueWork> {
        std::future::pending().await
    }

    /// Handles upkeep returned by [`Connector::wait_venue`].
    async fn service(&mut self, _work: VenueWork) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<C: Connector + ?Sized> Connector for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    async fn connect(&mut self) -> Result<String> {
        (**self).connect().await
    }

    async fn ping(&mut self) -> Result<String> {
        (**self).ping().await
    }

    async fn place_order(&mut self, order: &OrderRequest) -> Result<String> {
        (**self).place_order(order).await
    }

    async fn cancel_orders(&mut self, symbol: &str, account: Option<&str>) -> Result<String> {
        (**self).cancel_orders(symbol, account).await
    }

    async fn close(&mut self) {
        (**self).close().await;
    }

    async fn wait_venue(&mut self) -> Result<VenueWork> {
        (**self).wait_venue().await
    }

    async fn service(&mut self, work: VenueWork) -> Result<()> {
        (**self).service(work).await
    }
}
