/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Identifier generation for ClOrdID (11) and TestReqID (112).

use fixbridge_core::types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// Produces identifiers that are unique within the process.
///
/// Each id is a millisecond timestamp followed by a process-wide counter,
/// so two ids minted in the same millisecond still differ.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: &'static str,
    counter: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose ids start with `prefix`.
    #[must_use]
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the next identifier.
    pub fn next_id(&self) -> String {
        self.next_id_at(&Timestamp::now())
    }

    /// Returns the next identifier stamped with `ts`.
    pub fn next_id_at(&self, ts: &Timestamp) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}-{n}", self.prefix, ts.format_compact())
    }
}

static CL_ORD_IDS: IdGenerator = IdGenerator::new("FB");
static TEST_REQ_IDS: IdGenerator = IdGenerator::new("PING");

/// Generates a fresh ClOrdID, unique for the lifetime of the process.
#[must_use]
pub fn generate_cl_ord_id() -> String {
    CL_ORD_IDS.next_id()
}

/// Generates a fresh TestReqID.
#[must_use]
pub fn generate_test_req_id() -> String {
    TEST_REQ_IDS.next_id()
}
