//! Convenience re-exports for typical use.
//!
//! ```ignore
//! use vaultguard::prelude::*;
//! ```

pub use crate::{
    Guardian, GuardianBuilder, LockState, Result, UsageLevel, VaultError, VaultEvent,
};
