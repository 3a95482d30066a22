//! The guardian facade: the caller-facing action surface.
//!
//! Wires a [`Ledger`] to a [`GateController`] and exposes the five actions
//! the decision layer calls: check history, unlock, lock, generate a usage
//! contract, generate review questions. All actions return descriptive
//! strings; errors are recovered here and rendered, never propagated as
//! process failures.

use crate::report::render_report;
use crate::templates;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use vaultguard_core::LockState;
use vaultguard_gate::{Actuator, GateController, MosquittoActuator, DEFAULT_CHANNEL};
use vaultguard_ledger::Ledger;
use vaultguard_stats::access_report;

/// Default ledger location: a well-known file under the user's home
/// directory. `None` when no home directory can be determined.
pub fn default_ledger_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vault_guardian").join("ledger.vlg"))
}

/// The guardian: owns the ledger and the gate controller.
///
/// Construct via [`Guardian::builder`]. Construction does not fail: if the
/// ledger's backing file cannot be opened the guardian degrades to an
/// in-memory ledger with a warning, exactly as a supervised service should
/// keep answering rather than crash over its audit store.
pub struct Guardian<A: Actuator = MosquittoActuator> {
    ledger: Arc<Ledger>,
    gate: GateController<A>,
}

impl Guardian<MosquittoActuator> {
    /// Start configuring a guardian.
    pub fn builder() -> GuardianBuilder {
        GuardianBuilder::new()
    }
}

impl<A: Actuator> Guardian<A> {
    fn from_parts(ledger: Arc<Ledger>, gate: GateController<A>) -> Self {
        Guardian { ledger, gate }
    }

    /// Check when the vault was last accessed and how heavily it is used.
    ///
    /// A read-only advisory; storage problems degrade to the
    /// "never opened" report rather than erroring.
    pub fn check_access_history(&self) -> String {
        render_report(&access_report(&self.ledger))
    }

    /// Unlock the vault, recording justification and intended use.
    ///
    /// Returns a confirmation on success. An actuator failure comes back as
    /// an error string carrying the transport's diagnostic; a failed audit
    /// write after a successful unlock comes back as a confirmation with a
    /// WARNING line.
    pub fn unlock(&self, justification: &str, intended_use: &str) -> String {
        match self.gate.request_unlock(justification, intended_use) {
            Ok(transition) => {
                let mut out = format!(
                    "Vault unlocked. Access granted for: '{intended_use}'"
                );
                match transition.audit_warning {
                    None => out.push_str("\nYour justification has been recorded."),
                    Some(reason) => {
                        out.push_str(&format!(
                            "\nWARNING: the vault opened but the audit record was not written: {reason}"
                        ));
                    }
                }
                out
            }
            Err(e) => format!("Error unlocking vault: {e}"),
        }
    }

    /// Lock the vault back into its resting state.
    pub fn lock(&self) -> String {
        match self.gate.request_lock() {
            Ok(transition) => {
                let mut out = "Vault secured. The device is safely locked away.".to_string();
                if let Some(reason) = transition.audit_warning {
                    out.push_str(&format!(
                        "\nWARNING: the vault locked but the audit record was not written: {reason}"
                    ));
                }
                out
            }
            Err(e) => format!("Error securing vault: {e}"),
        }
    }

    /// Unlock the vault, returning the raw transition.
    ///
    /// The full-control variant of [`Self::unlock`]: callers that need the
    /// written event or a typed error (exit codes, scripting) use this;
    /// callers that want a human-readable string use `unlock`.
    pub fn try_unlock(
        &self,
        justification: &str,
        intended_use: &str,
    ) -> vaultguard_core::Result<vaultguard_gate::Transition> {
        self.gate.request_unlock(justification, intended_use)
    }

    /// Lock the vault, returning the raw transition.
    pub fn try_lock(&self) -> vaultguard_core::Result<vaultguard_gate::Transition> {
        self.gate.request_lock()
    }

    /// Generate the usage contract a caller agrees to before access.
    pub fn generate_contract(&self) -> String {
        templates::usage_contract(Utc::now())
    }

    /// Generate review questions for evaluating an access request.
    pub fn generate_review_questions(&self) -> String {
        templates::review_questions()
    }

    /// Logical lock state inferred from the ledger.
    pub fn state(&self) -> LockState {
        self.gate.current_state()
    }

    /// The ledger backing this guardian.
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }
}

/// Builder for guardian configuration.
///
/// ```ignore
/// let guardian = Guardian::builder()
///     .path("/var/lib/vaultguard/ledger.vlg")
///     .broker("mqtt.local")
///     .timeout(Duration::from_secs(2))
///     .open();
/// ```
pub struct GuardianBuilder {
    path: Option<PathBuf>,
    ephemeral: bool,
    broker: String,
    channel: String,
    timeout: Duration,
}

impl GuardianBuilder {
    /// Builder with defaults: home-directory ledger, broker on localhost,
    /// the standard relay channel, a five-second publish bound.
    pub fn new() -> Self {
        GuardianBuilder {
            path: None,
            ephemeral: false,
            broker: "localhost".to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            timeout: vaultguard_gate::DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    /// Ledger file path. Defaults to [`default_ledger_path`].
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Skip the backing file entirely; events last only for this process.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// MQTT broker host the relay listens behind.
    pub fn broker(mut self, host: impl Into<String>) -> Self {
        self.broker = host.into();
        self
    }

    /// Control channel to publish relay commands on.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Bound on a single publish attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Open the guardian with the real `mosquitto_pub` actuator.
    pub fn open(self) -> Guardian<MosquittoActuator> {
        let actuator = MosquittoActuator::new(self.broker.clone()).with_timeout(self.timeout);
        self.open_with_actuator(actuator)
    }

    /// Open the guardian with a caller-supplied actuator (tests, other
    /// transports).
    pub fn open_with_actuator<A: Actuator>(self, actuator: A) -> Guardian<A> {
        let ledger = Arc::new(self.open_ledger());
        let gate = GateController::with_channel(Arc::clone(&ledger), actuator, self.channel);
        Guardian::from_parts(ledger, gate)
    }

    /// Open the ledger, degrading to ephemeral instead of failing.
    fn open_ledger(&self) -> Ledger {
        if self.ephemeral {
            return Ledger::ephemeral();
        }
        let path = match self.path.clone().or_else(default_ledger_path) {
            Some(path) => path,
            None => {
                warn!("no home directory found; ledger will not persist");
                return Ledger::ephemeral();
            }
        };
        match Ledger::open(&path) {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!(error = %e, "ledger unavailable; continuing with in-memory storage");
                Ledger::ephemeral()
            }
        }
    }
}

impl Default for GuardianBuilder {
    fn default() -> Self {
        Self::new()
    }
}
