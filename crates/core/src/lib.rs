//! Core types for the vault guardian.
//!
//! This crate defines the shared vocabulary of the workspace: the immutable
//! [`VaultEvent`] record, the [`EventKind`] and [`LockState`] enums, timestamp
//! handling, and the canonical [`VaultError`] taxonomy. It contains no I/O;
//! everything that touches a file, a socket, or a subprocess lives in the
//! layer crates built on top of this one.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod timestamp;

pub use error::{Result, VaultError};
pub use event::{EventId, EventKind, LockState, VaultEvent};
