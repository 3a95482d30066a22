//! Outbound relay actuator.
//!
//! The physical lock is toggled by publishing `"ON"`/`"OFF"` to a control
//! channel on the local MQTT broker. The transport is the `mosquitto_pub`
//! command-line tool; [`Actuator`] is the seam that keeps the controller
//! independent of it.

use parking_lot::Mutex;
use std::fmt;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use vaultguard_core::{Result, VaultError};

/// Relay payloads understood by the lock hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    /// Energize the relay: vault unlocked.
    On,
    /// De-energize the relay: vault locked.
    Off,
}

impl RelayCommand {
    /// Wire payload published to the control channel.
    pub fn payload(&self) -> &'static str {
        match self {
            RelayCommand::On => "ON",
            RelayCommand::Off => "OFF",
        }
    }
}

impl fmt::Display for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payload())
    }
}

/// Fire-and-forget publisher of relay commands.
///
/// Implementations block until the publish is confirmed sent, failed, or
/// timed out; a call is never left pending indefinitely. Failure diagnostics
/// are passed through to the caller unmodified.
pub trait Actuator: Send + Sync {
    /// Publish one command to the named control channel.
    fn publish(&self, channel: &str, command: RelayCommand) -> Result<()>;
}

/// Default bound on a single publish attempt.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the spawned publisher is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Actuator that shells out to `mosquitto_pub`.
pub struct MosquittoActuator {
    host: String,
    timeout: Duration,
}

impl MosquittoActuator {
    /// Create an actuator publishing to the broker at `host`.
    pub fn new(host: impl Into<String>) -> Self {
        MosquittoActuator {
            host: host.into(),
            timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    /// Override the publish timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Actuator for MosquittoActuator {
    fn publish(&self, channel: &str, command: RelayCommand) -> Result<()> {
        debug!(channel, %command, host = %self.host, "publishing relay command");
        let child = Command::new("mosquitto_pub")
            .args(["-h", &self.host, "-t", channel, "-m", command.payload()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VaultError::Actuator {
                channel: channel.to_string(),
                message: e.to_string(),
            })?;
        wait_for_publisher(child, self.timeout, channel)
    }
}

/// Wait for a spawned publisher to exit within `timeout`.
///
/// Stderr is drained on its own thread from the start: a publisher that
/// writes more than the pipe buffer holds would otherwise block forever and
/// be misreported as a timeout instead of its real diagnostic.
fn wait_for_publisher(mut child: Child, timeout: Duration, channel: &str) -> Result<()> {
    let actuator_err = |message: String| VaultError::Actuator {
        channel: channel.to_string(),
        message,
    };

    let mut stderr = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut out = String::new();
            let _ = pipe.read_to_string(&mut out);
            out
        })
    });

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait().map_err(|e| actuator_err(e.to_string()))? {
            Some(status) if status.success() => return Ok(()),
            Some(_) => {
                let message = stderr
                    .take()
                    .and_then(|reader| reader.join().ok())
                    .unwrap_or_default();
                return Err(actuator_err(message.trim_end().to_string()));
            }
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(VaultError::ActuatorTimeout {
                    channel: channel.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}

/// Scripted failure behavior for [`MockActuator`].
#[derive(Debug, Clone)]
enum MockFailure {
    Fail(String),
    TimeOut(u64),
}

/// In-process actuator double that records what was published.
///
/// Ships as an ordinary type (not behind `cfg(test)`) so the facade and CLI
/// test suites can drive the controller without a broker.
#[derive(Default)]
pub struct MockActuator {
    published: Mutex<Vec<(String, RelayCommand)>>,
    failure: Mutex<Option<MockFailure>>,
}

impl MockActuator {
    /// Actuator that accepts every publish.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(MockFailure::Fail(message.into()));
    }

    /// Make every subsequent publish report a timeout.
    pub fn time_out(&self, timeout_ms: u64) {
        *self.failure.lock() = Some(MockFailure::TimeOut(timeout_ms));
    }

    /// Accept publishes again.
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Everything published so far, in order.
    pub fn published(&self) -> Vec<(String, RelayCommand)> {
        self.published.lock().clone()
    }
}

impl Actuator for MockActuator {
    fn publish(&self, channel: &str, command: RelayCommand) -> Result<()> {
        match self.failure.lock().clone() {
            Some(MockFailure::Fail(message)) => Err(VaultError::Actuator {
                channel: channel.to_string(),
                message,
            }),
            Some(MockFailure::TimeOut(timeout_ms)) => Err(VaultError::ActuatorTimeout {
                channel: channel.to_string(),
                timeout_ms,
            }),
            None => {
                self.published
                    .lock()
                    .push((channel.to_string(), command));
                Ok(())
            }
        }
    }
}
