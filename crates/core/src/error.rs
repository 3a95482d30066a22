//! Unified error taxonomy for the vault guardian.
//!
//! Every fallible operation in the workspace returns this one error type.
//! The variants are deliberately few: each one names a condition the caller
//! is expected to react to differently, and nothing here is allowed to
//! terminate the process.
//!
//! | Variant | Caller reaction |
//! |---------|-----------------|
//! | `StorageUnavailable` | degrade to an ephemeral ledger, keep running |
//! | `StorageWrite` | action succeeded physically; surface a loud warning |
//! | `Actuator` / `ActuatorTimeout` | action failed; report verbatim, no retry |
//! | `MalformedTimestamp` | report "unknown" elapsed time, never propagate |

use std::path::PathBuf;
use thiserror::Error;

/// All vault guardian errors.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The ledger's backing file cannot be opened or created.
    ///
    /// Raised only on the open path. Callers continue with an in-memory
    /// ledger rather than crash; every query then reports "no data".
    #[error("ledger unavailable at {path}: {reason}")]
    StorageUnavailable {
        /// Path that could not be opened or created.
        path: PathBuf,
        /// Underlying cause, human-readable.
        reason: String,
    },

    /// An append failed after the physical action already happened.
    ///
    /// The one dangerous inconsistency: lock state changed, audit record
    /// missing. Non-fatal to the enclosing action, but must be surfaced to
    /// the caller as a warning, never swallowed.
    #[error("ledger write failed: {0}")]
    StorageWrite(String),

    /// The outbound relay publish failed.
    ///
    /// Carries the transport's diagnostic unmodified. Not retried here;
    /// retry policy belongs to the calling layer.
    #[error("actuator failure on {channel}: {message}")]
    Actuator {
        /// Control channel the publish targeted.
        channel: String,
        /// Diagnostic from the transport, passed through verbatim.
        message: String,
    },

    /// The outbound relay publish did not finish within its bound.
    ///
    /// Treated exactly like a failed attempt: no ledger write, reported to
    /// the caller, never left pending.
    #[error("actuator timed out after {timeout_ms}ms on {channel}")]
    ActuatorTimeout {
        /// Control channel the publish targeted.
        channel: String,
        /// The bound that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// A stored timestamp cannot be parsed.
    ///
    /// Report paths fall back to "unknown" elapsed time instead of
    /// propagating this.
    #[error("malformed stored timestamp {raw:?}")]
    MalformedTimestamp {
        /// The raw stored text that failed to parse.
        raw: String,
    },
}

/// Result type for vault guardian operations.
pub type Result<T> = std::result::Result<T, VaultError>;

impl VaultError {
    /// Check if this error came from the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            VaultError::StorageUnavailable { .. } | VaultError::StorageWrite(_)
        )
    }

    /// Check if this error came from the outbound actuator call.
    pub fn is_actuator(&self) -> bool {
        matches!(
            self,
            VaultError::Actuator { .. } | VaultError::ActuatorTimeout { .. }
        )
    }

    /// Check if the enclosing action may still be treated as successful.
    ///
    /// True only for a failed append after a successful actuator call.
    pub fn is_audit_warning(&self) -> bool {
        matches!(self, VaultError::StorageWrite(_))
    }
}
