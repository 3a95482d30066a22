//! Event types for the append-only vault ledger.
//!
//! These types define the structure of records in the audit ledger. Events
//! are immutable once appended; the ledger exposes no update or delete.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a ledger event.
///
/// Stored as its lowercase text name on disk so further administrative kinds
/// can be added without breaking the record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The vault was unlocked and access granted.
    Opened,
    /// The vault was locked back into its resting state.
    Secured,
}

impl EventKind {
    /// Stable text name used in stored records and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Opened => "opened",
            EventKind::Secured => "secured",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opened" => Ok(EventKind::Opened),
            "secured" => Ok(EventKind::Secured),
            other => Err(UnknownEventKind(other.to_string())),
        }
    }
}

/// A stored event kind name that this build does not recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind(pub String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind {:?}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}

/// Identifier of a ledger event.
///
/// Assigned by the store, strictly increasing from 1 in insertion order with
/// no gaps or repeats. The sole ordering key of the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventId(pub u64);

impl EventId {
    /// The first id the store ever assigns.
    pub const FIRST: EventId = EventId(1);

    /// Raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id the store assigns after this one.
    pub fn next(&self) -> EventId {
        EventId(self.0 + 1)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One durable record of a lock-state transition.
///
/// Created exclusively by the gate controller as the direct consequence of a
/// validated lock/unlock action. Never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEvent {
    /// Store-assigned monotonic identifier.
    pub id: EventId,
    /// What happened.
    pub kind: EventKind,
    /// RFC 3339 wall-clock timestamp taken by the store at write time.
    ///
    /// Kept as text: the report path parses it on demand and degrades to
    /// "unknown" when a stored value cannot be parsed.
    pub timestamp: String,
    /// Free-text justification supplied by the caller. May be empty.
    pub details: String,
    /// Free-text stated purpose. May be empty; only meaningful for `Opened`.
    pub usage_intent: String,
}

/// Logical lock state of the vault.
///
/// Never persisted as its own entity; always inferred from the latest
/// ledger event. With no events the vault is considered locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    /// The resting state; also the state of an empty ledger.
    Locked,
    /// Access currently granted.
    Unlocked,
}

impl Default for LockState {
    fn default() -> Self {
        LockState::Locked
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockState::Locked => f.write_str("LOCKED"),
            LockState::Unlocked => f.write_str("UNLOCKED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_name_round_trips() {
        for kind in [EventKind::Opened, EventKind::Secured] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = "audited".parse::<EventKind>().unwrap_err();
        assert!(err.to_string().contains("audited"));
    }

    #[test]
    fn ids_order_by_value() {
        assert!(EventId(2) > EventId::FIRST);
        assert_eq!(EventId::FIRST.next(), EventId(2));
    }

    #[test]
    fn default_state_is_locked() {
        assert_eq!(LockState::default(), LockState::Locked);
    }
}
