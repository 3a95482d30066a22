//! On-disk byte format for the ledger file.
//!
//! Keeping serialization separate from the operational logic of the store
//! makes format evolution easier to manage.
//!
//! # Layout
//!
//! ```text
//! file   := header frame*
//! header := magic [u8; 4] | format_version u16 LE
//! frame  := payload_len u32 LE | crc32(payload) u32 LE | payload
//! ```
//!
//! The payload is the bincode encoding of [`StoredEvent`]. The event kind is
//! stored as text so new administrative kinds never break old files, and the
//! id is stored explicitly so replay can validate contiguity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use vaultguard_core::{EventId, EventKind, VaultEvent};

/// Magic bytes at the start of every ledger file.
pub const LEDGER_MAGIC: [u8; 4] = *b"VLGR";

/// Current on-disk format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 6;

/// Size of the per-frame prefix (length + checksum) in bytes.
pub const FRAME_PREFIX_SIZE: usize = 8;

/// Errors raised while encoding or decoding ledger bytes.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The file does not start with the ledger magic.
    #[error("not a ledger file (bad magic)")]
    BadMagic,

    /// The file header names a format this build cannot read.
    #[error("unsupported ledger format version {0}")]
    UnsupportedVersion(u16),

    /// The file is shorter than a complete header.
    #[error("ledger file shorter than its header")]
    TruncatedHeader,

    /// A record decoded cleanly but its id breaks the contiguous sequence.
    #[error("id sequence broken: expected {expected}, found {found}")]
    IdSequence {
        /// Id replay expected at this position.
        expected: EventId,
        /// Id actually stored.
        found: EventId,
    },

    /// A record's payload could not be serialized or deserialized.
    #[error("record serialization: {0}")]
    Serialization(String),
}

/// The persisted form of a [`VaultEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    id: u64,
    kind: String,
    timestamp: String,
    details: String,
    usage_intent: String,
}

impl From<&VaultEvent> for StoredEvent {
    fn from(event: &VaultEvent) -> Self {
        StoredEvent {
            id: event.id.as_u64(),
            kind: event.kind.as_str().to_string(),
            timestamp: event.timestamp.clone(),
            details: event.details.clone(),
            usage_intent: event.usage_intent.clone(),
        }
    }
}

impl StoredEvent {
    /// Convert back to the in-memory event type.
    ///
    /// An unrecognized kind name is a serialization error: the file was
    /// written by a newer build or damaged in place.
    pub fn into_event(self) -> Result<VaultEvent, FormatError> {
        let kind = EventKind::from_str(&self.kind)
            .map_err(|e| FormatError::Serialization(e.to_string()))?;
        Ok(VaultEvent {
            id: EventId(self.id),
            kind,
            timestamp: self.timestamp,
            details: self.details,
            usage_intent: self.usage_intent,
        })
    }
}

/// Encode the file header.
pub fn encode_header() -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[..4].copy_from_slice(&LEDGER_MAGIC);
    header[4..].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    header
}

/// Validate the file header of an existing ledger.
pub fn validate_header(bytes: &[u8]) -> Result<(), FormatError> {
    if bytes.len() < HEADER_SIZE {
        return Err(FormatError::TruncatedHeader);
    }
    if bytes[..4] != LEDGER_MAGIC {
        return Err(FormatError::BadMagic);
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Encode one event as a complete frame (prefix + payload).
pub fn encode_frame(event: &VaultEvent) -> Result<Vec<u8>, FormatError> {
    let payload = bincode::serialize(&StoredEvent::from(event))
        .map_err(|e| FormatError::Serialization(e.to_string()))?;
    let mut frame = Vec::with_capacity(FRAME_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Result of decoding one frame during replay.
pub enum FrameOutcome {
    /// A complete, checksum-valid frame; carries the bytes it consumed.
    Record(StoredEvent, usize),
    /// The remaining bytes do not form a complete valid frame.
    ///
    /// During replay this marks the torn tail left by an interrupted write:
    /// everything from this offset on is discarded.
    Torn,
}

/// Decode the frame starting at `bytes[offset..]`.
///
/// Length underruns, checksum mismatches, and undecodable payloads all
/// come back as [`FrameOutcome::Torn`]; replay cannot distinguish a crash
/// mid-write from damage, and in both cases the safe answer is to keep
/// every record before this point and drop the rest.
pub fn decode_frame(bytes: &[u8], offset: usize) -> FrameOutcome {
    let remaining = &bytes[offset..];
    if remaining.len() < FRAME_PREFIX_SIZE {
        return FrameOutcome::Torn;
    }
    let len = u32::from_le_bytes([remaining[0], remaining[1], remaining[2], remaining[3]]) as usize;
    let crc = u32::from_le_bytes([remaining[4], remaining[5], remaining[6], remaining[7]]);
    let body = &remaining[FRAME_PREFIX_SIZE..];
    if body.len() < len {
        return FrameOutcome::Torn;
    }
    let payload = &body[..len];
    if crc32fast::hash(payload) != crc {
        return FrameOutcome::Torn;
    }
    match bincode::deserialize::<StoredEvent>(payload) {
        Ok(record) => FrameOutcome::Record(record, FRAME_PREFIX_SIZE + len),
        Err(_) => FrameOutcome::Torn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(id: u64) -> VaultEvent {
        VaultEvent {
            id: EventId(id),
            kind: EventKind::Opened,
            timestamp: "2026-08-27T10:00:00.000000Z".to_string(),
            details: "fix alarm".to_string(),
            usage_intent: "set morning alarm".to_string(),
        }
    }

    #[test]
    fn header_round_trips() {
        validate_header(&encode_header()).unwrap();
    }

    #[test]
    fn header_rejects_bad_magic() {
        let mut header = encode_header();
        header[0] = b'X';
        assert!(matches!(
            validate_header(&header),
            Err(FormatError::BadMagic)
        ));
    }

    #[test]
    fn header_rejects_future_version() {
        let mut header = encode_header();
        header[4..].copy_from_slice(&9u16.to_le_bytes());
        assert!(matches!(
            validate_header(&header),
            Err(FormatError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn frame_round_trips() {
        let event = sample_event(1);
        let frame = encode_frame(&event).unwrap();
        match decode_frame(&frame, 0) {
            FrameOutcome::Record(stored, consumed) => {
                assert_eq!(consumed, frame.len());
                assert_eq!(stored.into_event().unwrap(), event);
            }
            FrameOutcome::Torn => panic!("fresh frame decoded as torn"),
        }
    }

    #[test]
    fn short_frame_is_torn() {
        let frame = encode_frame(&sample_event(1)).unwrap();
        for cut in [0, 3, FRAME_PREFIX_SIZE, frame.len() - 1] {
            assert!(matches!(decode_frame(&frame[..cut], 0), FrameOutcome::Torn));
        }
    }

    #[test]
    fn corrupt_payload_is_torn() {
        let mut frame = encode_frame(&sample_event(1)).unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert!(matches!(decode_frame(&frame, 0), FrameOutcome::Torn));
    }

    #[test]
    fn unknown_kind_fails_conversion() {
        let stored = StoredEvent {
            id: 1,
            kind: "audited".to_string(),
            timestamp: String::new(),
            details: String::new(),
            usage_intent: String::new(),
        };
        assert!(stored.into_event().is_err());
    }
}
