/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Command-channel request parsing.
//!
//! A request is one trimmed line: a verb matched case-insensitively followed
//! by whitespace-separated arguments. Argument problems are reported here and
//! never reach a connector.

use fixbridge_core::error::ConnectorError;
use fixbridge_core::types::{OrdType, Side};
use fixbridge_engine::OrderRequest;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Usage line for PLACE.
pub const PLACE_USAGE: &str = "PLACE symbol side qty price [type]";

/// Usage line for CANCEL.
pub const CANCEL_USAGE: &str = "CANCEL symbol [account]";

/// Errors raised while parsing a request line.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The line held no verb.
    #[error("empty command")]
    Empty,

    /// The verb is not part of the command set.
    #[error("unknown command '{0}'")]
    Unknown(String),

    /// Wrong number of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// Quantity is not an integer.
    #[error("qty must be an integer")]
    InvalidQuantity,

    /// Price is not a decimal number.
    #[error("price must be a number")]
    InvalidPrice,

    /// An argument parsed but failed order validation.
    #[error(transparent)]
    Invalid(#[from] ConnectorError),
}

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Keep-alive round trip.
    Ping,
    /// Establish the venue session.
    Connect,
    /// Submit a new order.
    Place(OrderRequest),
    /// Cancel orders for a symbol.
    Cancel {
        /// Instrument symbol.
        symbol: String,
        /// Optional account.
        account: Option<String>,
    },
    /// Close this client and stop serving.
    Exit,
    /// Same as [`Command::Exit`] with the pipe-era acknowledgment.
    Shutdown,
}

impl Command {
    /// Parses one request line.
    ///
    /// # Errors
    /// Returns a [`CommandError`] describing the first problem found.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = parts.collect();

        match verb.to_ascii_uppercase().as_str() {
            "PING" => no_args(&args, "PING").map(|()| Self::Ping),
            "CONNECT" => no_args(&args, "CONNECT").map(|()| Self::Connect),
            "EXIT" => no_args(&args, "EXIT").map(|()| Self::Exit),
            "SHUTDOWN" => no_args(&args, "SHUTDOWN").map(|()| Self::Shutdown),
            "PLACE" => parse_place(&args).map(Self::Place),
            "CANCEL" => match args.as_slice() {
                [symbol] => Ok(Self::Cancel {
                    symbol: (*symbol).to_string(),
                    account: None,
                }),
                [symbol, account] => Ok(Self::Cancel {
                    symbol: (*symbol).to_string(),
                    account: Some((*account).to_string()),
                }),
                _ => Err(CommandError::Usage(CANCEL_USAGE)),
            },
            _ => Err(CommandError::Unknown(verb.to_string())),
        }
    }

    /// Verb name used in logs.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Connect => "CONNECT",
            Self::Place(_) => "PLACE",
            Self::Cancel { .. } => "CANCEL",
            Self::Exit => "EXIT",
            Self::Shutdown => "SHUTDOWN",
        }
    }
}

fn no_args(args: &[&str], usage: &'static str) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::Usage(usage))
    }
}

fn parse_place(args: &[&str]) -> Result<OrderRequest, CommandError> {
    let (symbol, side, qty, price, ord_type) = match *args {
        [symbol, side, qty, price] => (symbol, side, qty, price, None),
        [symbol, side, qty, price, ord_type] => (symbol, side, qty, price, Some(ord_type)),
        _ => return Err(CommandError::Usage(PLACE_USAGE)),
    };

    let side = Side::from_str(side)?;
    let qty: i64 = qty.parse().map_err(|_| CommandError::InvalidQuantity)?;
    let price = Decimal::from_str(price).map_err(|_| CommandError::InvalidPrice)?;
    let ord_type = match ord_type {
        Some(value) => OrdType::from_str(value)?,
        None => OrdType::default(),
    };

    // Negative quantities fold to zero, which order validation rejects.
    let qty = u64::try_from(qty).unwrap_or(0);
    Ok(OrderRequest::new(symbol, side, qty, price, ord_type)?)
}
