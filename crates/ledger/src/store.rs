//! The ledger store: open/replay, append, and temporal queries.

use crate::format::{
    self, decode_frame, encode_frame, encode_header, FormatError, FrameOutcome, HEADER_SIZE,
};
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vaultguard_core::{timestamp, EventId, EventKind, Result, VaultError, VaultEvent};

/// Durable, ordered, append-only store of [`VaultEvent`] records.
///
/// All appends are serialized through a single writer lock; reads may run
/// concurrently and never observe a partially written record, because a
/// record only enters the in-memory index after its frame is fsynced.
///
/// Constructed either durable ([`Ledger::open`]) or in-memory
/// ([`Ledger::ephemeral`], the degraded mode used when the backing file
/// cannot be opened).
#[derive(Debug)]
pub struct Ledger {
    inner: RwLock<Inner>,
    path: Option<PathBuf>,
}

#[derive(Debug)]
struct Inner {
    /// Backing file; `None` in ephemeral mode.
    file: Option<File>,
    /// File length up to the end of the last fully fsynced frame.
    durable_len: u64,
    /// All events, oldest first. Index i holds id i + 1.
    events: Vec<VaultEvent>,
    next_id: EventId,
    #[cfg(test)]
    fail_next_write: bool,
}

impl Inner {
    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        #[cfg(test)]
        if self.fail_next_write {
            self.fail_next_write = false;
            if let Some(file) = self.file.as_mut() {
                // Leave the partial bytes an interrupted write leaves.
                file.write_all(&frame[..frame.len() / 2])?;
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected write failure",
            ));
        }
        match self.file.as_mut() {
            Some(file) => file.write_all(frame).and_then(|_| file.sync_all()),
            None => Ok(()),
        }
    }

    /// Roll the file back to the last durable frame after a failed append.
    ///
    /// The failed frame's bytes must never reach replay: left in place they
    /// either collide with the reissued id or mark everything written after
    /// them as a torn tail. If the rollback itself fails the backing file is
    /// abandoned and the store continues in memory.
    fn rollback_failed_append(&mut self) {
        let Some(file) = self.file.as_mut() else { return };
        if let Err(e) = file.set_len(self.durable_len).and_then(|_| file.sync_all()) {
            warn!(
                error = %e,
                "failed append could not be rolled back; abandoning the backing file"
            );
            self.file = None;
        }
    }
}

impl Ledger {
    /// Open the ledger at `path`, creating it if absent.
    ///
    /// Idempotent: safe to call on every process start. An existing file is
    /// replayed in full, preserving events and continuing the id sequence; a
    /// partial trailing frame (torn write from a crash) is truncated away
    /// with a warning.
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` when the file cannot be created or opened, its
    /// header is not a ledger header, or replay finds a broken id sequence.
    /// Callers are expected to fall back to [`Ledger::ephemeral`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |reason: String| VaultError::StorageUnavailable {
            path: path.clone(),
            reason,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| unavailable(e.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| unavailable(e.to_string()))?;

        let (events, next_id, durable_len) = if bytes.is_empty() {
            file.write_all(&encode_header())
                .and_then(|_| file.sync_all())
                .map_err(|e| unavailable(e.to_string()))?;
            (Vec::new(), EventId::FIRST, HEADER_SIZE as u64)
        } else {
            Self::replay(&path, &file, &bytes).map_err(|e| unavailable(e.to_string()))?
        };

        debug!(path = %path.display(), events = events.len(), "ledger opened");
        Ok(Ledger {
            inner: RwLock::new(Inner {
                file: Some(file),
                durable_len,
                events,
                next_id,
                #[cfg(test)]
                fail_next_write: false,
            }),
            path: Some(path),
        })
    }

    /// Create an in-memory ledger with no backing file.
    ///
    /// The degraded mode: same API, no durability. All data is lost on drop.
    /// Also the right store for unit tests that need isolation and speed.
    pub fn ephemeral() -> Self {
        Ledger {
            inner: RwLock::new(Inner {
                file: None,
                durable_len: 0,
                events: Vec::new(),
                next_id: EventId::FIRST,
                #[cfg(test)]
                fail_next_write: false,
            }),
            path: None,
        }
    }

    /// Replay an existing file into memory, truncating a torn tail.
    fn replay(
        path: &Path,
        file: &File,
        bytes: &[u8],
    ) -> std::result::Result<(Vec<VaultEvent>, EventId, u64), FormatError> {
        format::validate_header(bytes)?;

        let mut events = Vec::new();
        let mut expected = EventId::FIRST;
        let mut offset = HEADER_SIZE;
        while offset < bytes.len() {
            match decode_frame(bytes, offset) {
                FrameOutcome::Record(stored, consumed) => {
                    let event = stored.into_event()?;
                    if event.id != expected {
                        return Err(FormatError::IdSequence {
                            expected,
                            found: event.id,
                        });
                    }
                    expected = event.id.next();
                    events.push(event);
                    offset += consumed;
                }
                FrameOutcome::Torn => {
                    warn!(
                        path = %path.display(),
                        offset,
                        dropped = bytes.len() - offset,
                        "truncating torn tail of ledger file"
                    );
                    file.set_len(offset as u64)
                        .and_then(|_| file.sync_all())
                        .map_err(|e| FormatError::Serialization(e.to_string()))?;
                    break;
                }
            }
        }
        Ok((events, expected, offset as u64))
    }

    /// Append one event, assigning the next id and a wall-clock timestamp.
    ///
    /// The frame is written and fsynced before the event becomes visible to
    /// readers. On failure nothing becomes visible: any partial frame that
    /// reached the disk is truncated away before this returns.
    ///
    /// # Errors
    ///
    /// `StorageWrite` on any encoding or I/O failure. The in-memory state is
    /// unchanged in that case and the file is rolled back to its last
    /// durable frame, so the id is reissued to the next append and replay
    /// never sees the failed frame's bytes.
    pub fn append(
        &self,
        kind: EventKind,
        details: impl Into<String>,
        usage_intent: impl Into<String>,
    ) -> Result<VaultEvent> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let event = VaultEvent {
            id: inner.next_id,
            kind,
            timestamp: timestamp::now(),
            details: details.into(),
            usage_intent: usage_intent.into(),
        };

        if inner.file.is_some() {
            let frame =
                encode_frame(&event).map_err(|e| VaultError::StorageWrite(e.to_string()))?;
            if let Err(e) = inner.write_frame(&frame) {
                inner.rollback_failed_append();
                return Err(VaultError::StorageWrite(e.to_string()));
            }
            inner.durable_len += frame.len() as u64;
        }

        debug!(id = %event.id, kind = %event.kind, "event appended");
        inner.next_id = event.id.next();
        inner.events.push(event.clone());
        Ok(event)
    }

    /// Most recent event of the given kind, by id. `None` when there is none.
    pub fn latest(&self, kind: EventKind) -> Option<VaultEvent> {
        self.inner
            .read()
            .events
            .iter()
            .rev()
            .find(|e| e.kind == kind)
            .cloned()
    }

    /// Most recent event of any kind. `None` on an empty ledger.
    pub fn head(&self) -> Option<VaultEvent> {
        self.inner.read().events.last().cloned()
    }

    /// Number of events of `kind` with a timestamp in `[now - window, now]`,
    /// lower bound inclusive.
    ///
    /// Always an answer, never an error: an empty ledger counts 0, and a
    /// record whose stored timestamp cannot be parsed is skipped.
    pub fn count_since(&self, kind: EventKind, window: Duration) -> u64 {
        let now = Utc::now();
        let cutoff = now - window;
        self.inner
            .read()
            .events
            .iter()
            .filter(|e| e.kind == kind)
            .filter(|e| match timestamp::parse(&e.timestamp) {
                Ok(at) => at >= cutoff && at <= now,
                Err(_) => {
                    warn!(id = %e.id, raw = %e.timestamp, "skipping event with malformed timestamp");
                    false
                }
            })
            .count() as u64
    }

    /// All events, oldest first.
    pub fn events(&self) -> Vec<VaultEvent> {
        self.inner.read().events.clone()
    }

    /// Total number of events.
    pub fn len(&self) -> u64 {
        self.inner.read().events.len() as u64
    }

    /// Check if the ledger holds no events.
    pub fn is_empty(&self) -> bool {
        self.inner.read().events.is_empty()
    }

    /// Backing file path; `None` in ephemeral mode.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if this ledger runs without a backing file.
    pub fn is_ephemeral(&self) -> bool {
        self.path.is_none()
    }
}

#[cfg(test)]
impl Ledger {
    /// Make the next append fail after writing half its frame.
    fn fail_next_write(&self) {
        self.inner.write().fail_next_write = true;
    }
}
