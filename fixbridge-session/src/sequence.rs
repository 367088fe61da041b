/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Outbound sequence numbering.
//!
//! Only the outbound counter is tracked: inbound gap detection and resend
//! handling are outside what the bridge does.

use fixbridge_core::types::SeqNum;
use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates MsgSeqNum (34) values for one session.
///
/// Starts at 1, advances by exactly one per allocated message and is reset
/// on every new connection.
#[derive(Debug)]
pub struct SequenceManager {
    next_sender_seq: AtomicU64,
}

impl SequenceManager {
    /// Creates a new sequence manager starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_sender_seq: AtomicU64::new(1),
        }
    }

    /// Returns the next sender sequence number without incrementing.
    #[inline]
    #[must_use]
    pub fn next_sender_seq(&self) -> SeqNum {
        SeqNum::new(self.next_sender_seq.load(Ordering::SeqCst))
    }

    /// Allocates and returns the next sender sequence number.
    #[inline]
    pub fn allocate_sender_seq(&self) -> SeqNum {
        SeqNum::new(self.next_sender_seq.fetch_add(1, Ordering::SeqCst))
    }

    /// Resets the counter to 1.
    #[inline]
    pub fn reset(&self) {
        self.next_sender_seq.store(1, Ordering::SeqCst);
    }
}

impl Default for SequenceManager {
    fn default() -> Self {
        Self::new()
    }
}
