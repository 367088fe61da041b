/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Offline connector for local smoke tests and CI.

use crate::connector::Connector;
use crate::order::OrderRequest;
use async_trait::async_trait;
use fixbridge_core::error::{ConnectorError, Result};
use fixbridge_session::{IdGenerator, SessionConfig};
use tracing::info;

static STUB_ORDER_IDS: IdGenerator = IdGenerator::new("STUB-");

/// Connector that never touches the network.
///
/// It keeps a connected flag so commands behave as they would against the
/// venue: CONNECT checks credentials, and the other operations need a prior
/// CONNECT.
#[derive(Debug)]
pub struct StubConnector {
    config: SessionConfig,
    connected: bool,
}

impl StubConnector {
    /// Creates a disconnected stub.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            connected: false,
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(ConnectorError::NotConnected)
        }
    }
}

#[async_trait]
impl Connector for StubConnector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<String> {
        self.config.validate_credentials()?;
        self.connected = true;
        info!(host = %self.config.host, port = self.config.port, "stub connected");
        Ok(format!(
            "stub connected (host={}:{} user={})",
            self.config.host, self.config.port, self.config.username
        ))
    }

    async fn ping(&mut self) -> Result<String> {
        self.ensure_connected()?;
        Ok("PONG".to_string())
    }

    async fn place_order(&mut self, order: &OrderRequest) -> Result<String> {
        self.ensure_connected()?;
        let order_id = STUB_ORDER_IDS.next_id();
        info!(order_id = %order_id, symbol = order.symbol(), "stub order placed");
        Ok(format!(
            "{order_id} stub order placed: {} {} {}@{} type={}",
            order.symbol(),
            order.side(),
            order.quantity(),
            order.price(),
            order.ord_type()
        ))
    }

    async fn cancel_orders(&mut self, symbol: &str, account: Option<&str>) -> Result<String> {
        self.ensure_connected()?;
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ConnectorError::Validation("symbol is required".to_string()));
        }
        Ok(match account.filter(|a| !a.is_empty()) {
            Some(account) => format!("cancel request sent (stub {symbol} account={account})"),
            None => format!("cancel request sent (stub {symbol})"),
        })
    }

    async fn close(&mut self) {
        if self.connected {
            self.connected = false;
            info!("stub disconnected");
        }
    }
}
