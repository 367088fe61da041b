/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # fixbridge Server
//!
//! Local command channel for the fixbridge bridge.
//!
//! A client sends one request per line (`PING`, `CONNECT`, `PLACE`,
//! `CANCEL`, `EXIT`) and gets exactly one `OK …` or `ERROR …` line back.
//! Requests run one at a time against a single [`Connector`](fixbridge_engine::Connector).
//!
//! ```text
//! > CONNECT
//! < OK connected
//! > PLACE AAPL BUY 100 150.25 LIMIT
//! < OK 7420017
//! > EXIT
//! < OK bye
//! ```

pub mod command;
pub mod endpoint;
pub mod error;
pub mod response_log;
pub mod server;

pub use command::{Command, CommandError};
pub use endpoint::{DEFAULT_ENDPOINT, Endpoint, Listener};
pub use error::ServerError;
pub use response_log::ResponseLog;
pub use server::{CommandServer, DEFAULT_IDLE_TIMEOUT, Disconnect, MAX_REQUEST_LEN, Reply};
