//! Gate controller: the state-transition authority.
//!
//! The controller is the only component permitted to request a physical
//! lock-state change and the only component permitted to append to the
//! ledger. The write path is strictly ordered: actuator first, ledger
//! second. A failed actuator call leaves the ledger untouched; a failed
//! append after a successful actuator call is the one inconsistency the
//! system can produce, and it is surfaced loudly instead of rolled back.
//!
//! The controller enforces no precondition on the current logical state:
//! both transitions are accepted unconditionally. It is a mechanism; when a
//! transition is appropriate is the calling policy layer's decision.

use crate::actuator::{Actuator, RelayCommand};
use std::sync::Arc;
use tracing::warn;
use vaultguard_core::{EventKind, LockState, Result, VaultEvent};
use vaultguard_ledger::Ledger;

/// Control channel the lock hardware listens on.
pub const DEFAULT_CHANNEL: &str = "vault/relay";

/// Outcome of a successfully actuated transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The logical state the vault is now in.
    pub state: LockState,
    /// The audit record written for this transition, when the append
    /// succeeded.
    pub event: Option<VaultEvent>,
    /// Set when the physical state changed but the audit record could not
    /// be written. Must be shown to the caller, never swallowed.
    pub audit_warning: Option<String>,
}

/// Drives the relay and writes through to the ledger.
pub struct GateController<A: Actuator> {
    ledger: Arc<Ledger>,
    actuator: A,
    channel: String,
}

impl<A: Actuator> GateController<A> {
    /// Controller publishing on [`DEFAULT_CHANNEL`].
    pub fn new(ledger: Arc<Ledger>, actuator: A) -> Self {
        Self::with_channel(ledger, actuator, DEFAULT_CHANNEL)
    }

    /// Controller publishing on a custom control channel.
    pub fn with_channel(ledger: Arc<Ledger>, actuator: A, channel: impl Into<String>) -> Self {
        GateController {
            ledger,
            actuator,
            channel: channel.into(),
        }
    }

    /// Unlock the vault.
    ///
    /// Publishes `ON`, then appends an `Opened` event carrying the caller's
    /// justification and intended use.
    ///
    /// # Errors
    ///
    /// The actuator's error, verbatim, when the publish fails or times out;
    /// no event is appended in that case and no retry is attempted.
    pub fn request_unlock(
        &self,
        justification: impl Into<String>,
        intended_use: impl Into<String>,
    ) -> Result<Transition> {
        self.actuator.publish(&self.channel, RelayCommand::On)?;
        Ok(self.record(LockState::Unlocked, EventKind::Opened, justification.into(), intended_use.into()))
    }

    /// Lock the vault.
    ///
    /// Publishes `OFF`, then appends a `Secured` event with empty
    /// details/intent. Failure handling as for [`Self::request_unlock`].
    pub fn request_lock(&self) -> Result<Transition> {
        self.actuator.publish(&self.channel, RelayCommand::Off)?;
        Ok(self.record(LockState::Locked, EventKind::Secured, String::new(), String::new()))
    }

    /// Append the audit record for an already-actuated transition.
    ///
    /// The physical state has changed by the time this runs, so an append
    /// failure is converted into an audit warning on the transition rather
    /// than an error.
    fn record(
        &self,
        state: LockState,
        kind: EventKind,
        details: String,
        usage_intent: String,
    ) -> Transition {
        match self.ledger.append(kind, details, usage_intent) {
            Ok(event) => Transition {
                state,
                event: Some(event),
                audit_warning: None,
            },
            Err(e) => {
                warn!(%kind, error = %e, "lock state changed but audit record was not written");
                Transition {
                    state,
                    event: None,
                    audit_warning: Some(e.to_string()),
                }
            }
        }
    }

    /// Logical lock state, inferred from the latest ledger event.
    ///
    /// An empty ledger (or one whose history was lost to degraded mode) is
    /// reported as locked, the vault's resting state.
    pub fn current_state(&self) -> LockState {
        match self.ledger.head().map(|e| e.kind) {
            Some(EventKind::Opened) => LockState::Unlocked,
            Some(EventKind::Secured) | None => LockState::Locked,
        }
    }

    /// The ledger this controller writes through to.
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// The control channel this controller publishes on.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::MockActuator;
    use vaultguard_core::{EventId, VaultError};

    fn controller() -> GateController<MockActuator> {
        GateController::new(Arc::new(Ledger::ephemeral()), MockActuator::new())
    }

    #[test]
    fn unlock_publishes_on_then_appends_opened() {
        let gate = controller();
        let transition = gate.request_unlock("fix alarm", "set morning alarm").unwrap();

        assert_eq!(transition.state, LockState::Unlocked);
        assert!(transition.audit_warning.is_none());

        let event = transition.event.unwrap();
        assert_eq!(event.id, EventId(1));
        assert_eq!(event.kind, EventKind::Opened);
        assert_eq!(event.details, "fix alarm");
        assert_eq!(event.usage_intent, "set morning alarm");

        assert_eq!(
            gate.actuator.published(),
            vec![(DEFAULT_CHANNEL.to_string(), RelayCommand::On)]
        );
    }

    #[test]
    fn lock_publishes_off_then_appends_secured() {
        let gate = controller();
        let transition = gate.request_lock().unwrap();

        assert_eq!(transition.state, LockState::Locked);
        let event = transition.event.unwrap();
        assert_eq!(event.kind, EventKind::Secured);
        assert!(event.details.is_empty());
        assert!(event.usage_intent.is_empty());

        assert_eq!(
            gate.actuator.published(),
            vec![(DEFAULT_CHANNEL.to_string(), RelayCommand::Off)]
        );
    }

    #[test]
    fn failed_actuator_leaves_ledger_untouched() {
        let gate = controller();
        gate.actuator.fail_with("Error: broker unreachable");

        let err = gate.request_unlock("why", "what").unwrap_err();
        assert!(err.is_actuator());
        assert!(err.to_string().contains("Error: broker unreachable"));
        assert!(gate.ledger().is_empty());
    }

    #[test]
    fn timeout_counts_as_failed_attempt() {
        let gate = controller();
        gate.actuator.time_out(5000);

        let err = gate.request_lock().unwrap_err();
        assert!(matches!(err, VaultError::ActuatorTimeout { timeout_ms: 5000, .. }));
        assert!(gate.ledger().is_empty());
    }

    #[test]
    fn state_follows_latest_event() {
        let gate = controller();
        assert_eq!(gate.current_state(), LockState::Locked);

        gate.request_unlock("", "").unwrap();
        assert_eq!(gate.current_state(), LockState::Unlocked);

        gate.request_lock().unwrap();
        assert_eq!(gate.current_state(), LockState::Locked);
    }

    #[test]
    fn transitions_have_no_state_precondition() {
        let gate = controller();
        // Double unlock and double lock are both accepted; the ledger
        // simply records what was asked.
        gate.request_unlock("a", "").unwrap();
        gate.request_unlock("b", "").unwrap();
        gate.request_lock().unwrap();
        gate.request_lock().unwrap();
        assert_eq!(gate.ledger().len(), 4);
    }

    #[test]
    fn custom_channel_is_used() {
        let gate = GateController::with_channel(
            Arc::new(Ledger::ephemeral()),
            MockActuator::new(),
            "garage/relay",
        );
        gate.request_unlock("", "").unwrap();
        assert_eq!(gate.actuator.published()[0].0, "garage/relay");
    }
}
