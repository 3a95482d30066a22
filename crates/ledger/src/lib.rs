//! Durable append-only ledger of vault events.
//!
//! The ledger owns the backing file exclusively; every other component reads
//! events through its query interface and only the gate controller appends.
//!
//! ## Guarantees
//!
//! - **Append-only**: no update or delete is exposed.
//! - **Atomic appends**: a record is durable (fsynced) before it becomes
//!   visible to readers; a write that fails partway leaves no visible record.
//! - **Ordered ids**: ids are assigned under a single writer lock, strictly
//!   increasing from 1 with no gaps or repeats.
//! - **Idempotent initialize**: opening an existing ledger preserves its
//!   events and continues the id sequence; opening a fresh path creates it.
//! - **Torn-tail recovery**: a partial trailing frame left by a crash is
//!   truncated on the next open; every complete record before it survives.

#![warn(missing_docs)]

mod format;
mod store;

pub use format::{FORMAT_VERSION, LEDGER_MAGIC};
pub use store::Ledger;
