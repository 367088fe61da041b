/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Server error types.

use thiserror::Error;

/// Errors raised while setting up the command channel.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The endpoint string could not be used.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as given.
        endpoint: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Binding or preparing the listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
