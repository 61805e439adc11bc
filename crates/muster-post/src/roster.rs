//! The participant roster: who is present, and their current status.
//!
//! Mutated by envelope dispatch as presence messages arrive, read by
//! presentation collaborators. Updates carry a monotonic sequence so a
//! delayed earlier status can never overwrite a later one.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Error reading the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// No record for this participant.
    UnknownParticipant(String),
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::UnknownParticipant(who) => write!(f, "unknown participant {who:?}"),
        }
    }
}

impl std::error::Error for RosterError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Presence {
    status: String,
    seq: u64,
}

/// Concurrency-safe participant → status map for one node.
///
/// All mutation goes through one interior lock; callers racing with the
/// dispatch loop see either the old or the new record, never a torn one.
#[derive(Default)]
pub struct Roster {
    records: RwLock<HashMap<String, Presence>>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    /// Insert or update a participant's status.
    ///
    /// Returns whether the write was applied. A write with a sequence not
    /// greater than the stored one is stale — a delayed earlier update —
    /// and is rejected.
    pub fn upsert(&self, participant: &str, status: impl Into<String>, seq: u64) -> bool {
        let mut records = self.records.write();
        if let Some(existing) = records.get(participant) {
            if seq <= existing.seq {
                tracing::debug!(participant, seq, have = existing.seq, "rejecting stale status");
                return false;
            }
        }
        records.insert(
            participant.to_string(),
            Presence {
                status: status.into(),
                seq,
            },
        );
        true
    }

    /// Remove a departed participant. Returns whether they were present.
    pub fn remove(&self, participant: &str) -> bool {
        self.records.write().remove(participant).is_some()
    }

    /// Current status of a participant.
    pub fn status_of(&self, participant: &str) -> Result<String, RosterError> {
        self.records
            .read()
            .get(participant)
            .map(|p| p.status.clone())
            .ok_or_else(|| RosterError::UnknownParticipant(participant.to_string()))
    }

    /// Present participants, sorted for stable presentation.
    pub fn participants(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
