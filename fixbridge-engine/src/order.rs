/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Validated order parameters.

use fixbridge_core::error::ConnectorError;
use fixbridge_core::types::{OrdType, Side};
use rust_decimal::Decimal;

/// A new order that has passed local validation.
///
/// Construct with [`OrderRequest::new`]; the fields are only readable so a
/// connector can rely on the invariants below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    symbol: String,
    side: Side,
    quantity: u64,
    price: Decimal,
    ord_type: OrdType,
}

impl OrderRequest {
    /// Validates and builds an order.
    ///
    /// # Errors
    /// Returns `ConnectorError::Validation` if the symbol is empty, the
    /// quantity is zero, or a LIMIT order has a price that is not positive.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        quantity: u64,
        price: Decimal,
        ord_type: OrdType,
    ) -> Result<Self, ConnectorError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ConnectorError::Validation("symbol is required".to_string()));
        }
        if quantity == 0 {
            return Err(ConnectorError::Validation(
                "qty must be a positive integer".to_string(),
            ));
        }
        if ord_type.carries_price() && price <= Decimal::ZERO {
            return Err(ConnectorError::Validation(
                "price must be positive for LIMIT orders".to_string(),
            ));
        }
        Ok(Self {
            symbol,
            side,
            quantity,
            price,
            ord_type,
        })
    }

    /// Instrument symbol (55).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Side (54).
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// OrderQty (38).
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Price (44); only sent for LIMIT orders.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// OrdType (40).
    #[must_use]
    pub const fn ord_type(&self) -> OrdType {
        self.ord_type
    }
}
