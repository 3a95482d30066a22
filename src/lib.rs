//! # Vaultguard
//!
//! Access-gate controller for a relay-locked vault with a durable audit
//! ledger.
//!
//! The vault's physical lock is toggled by publishing control messages to a
//! relay over MQTT. Every transition is recorded in an append-only ledger,
//! and the ledger feeds the advisory statistics a human guardian uses to
//! decide whether access should be granted.
//!
//! ## Quick start
//!
//! ```ignore
//! use vaultguard::prelude::*;
//!
//! // Ledger at the default location, broker on localhost.
//! let guardian = Guardian::builder().open();
//!
//! println!("{}", guardian.check_access_history());
//! println!("{}", guardian.unlock("fix alarm", "set morning alarm"));
//! println!("{}", guardian.lock());
//! ```
//!
//! ## Layers
//!
//! - [`vaultguard_ledger::Ledger`] — durable append-only store of
//!   [`VaultEvent`] records
//! - [`vaultguard_stats`] — last-open / rolling-window statistics and usage
//!   classification
//! - [`vaultguard_gate::GateController`] — the one component that drives the
//!   relay and appends to the ledger
//! - [`Guardian`] — the caller-facing action surface

#![warn(missing_docs)]

mod guardian;
mod report;
mod templates;

pub mod prelude;

pub use guardian::{default_ledger_path, Guardian, GuardianBuilder};
pub use report::render_report;
pub use templates::{review_questions, usage_contract};

// Re-export the vocabulary types callers interact with.
pub use vaultguard_core::{EventId, EventKind, LockState, Result, VaultError, VaultEvent};
pub use vaultguard_gate::{Actuator, MockActuator, MosquittoActuator, Transition, DEFAULT_CHANNEL};
pub use vaultguard_ledger::Ledger;
pub use vaultguard_stats::{access_report, AccessReport, Elapsed, UsageLevel};
