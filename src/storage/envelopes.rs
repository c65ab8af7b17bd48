//! Envelope repository for JSON storage
//!
//! Envelopes and the stash log live together in envelopes.json so that a
//! stash (log append plus two balance changes) lands in a single atomic file
//! write.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Envelope, EnvelopeId, Money, Stash};

use super::file_io::JsonFile;
use super::{read_lock, write_lock};

/// Serializable envelope data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EnvelopeData {
    pub envelopes: Vec<Envelope>,
    #[serde(default)]
    pub stashes: Vec<Stash>,
}

#[derive(Debug, Clone, Default)]
struct EnvelopeState {
    envelopes: HashMap<EnvelopeId, Envelope>,
    /// Append-only, in commit order
    stashes: Vec<Stash>,
}

impl EnvelopeState {
    fn to_data(&self) -> EnvelopeData {
        EnvelopeData {
            envelopes: sorted_envelopes(self.envelopes.values().cloned().collect()),
            stashes: self.stashes.clone(),
        }
    }
}

/// Available first, then ordinary envelopes by name
fn sorted_envelopes(mut envelopes: Vec<Envelope>) -> Vec<Envelope> {
    envelopes.sort_by(|a, b| {
        b.is_available()
            .cmp(&a.is_available())
            .then_with(|| a.name.cmp(&b.name))
    });
    envelopes
}

/// Optimistic version expectations for the two sides of a stash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedVersions {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// State after a committed stash
#[derive(Debug, Clone)]
pub struct StashOutcome {
    pub stash: Stash,
    pub from: Envelope,
    pub to: Envelope,
}

/// Repository for envelope and stash persistence
pub struct EnvelopeRepository {
    file: JsonFile,
    state: RwLock<EnvelopeState>,
}

impl EnvelopeRepository {
    /// Create a new envelope repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
            state: RwLock::new(EnvelopeState::default()),
        }
    }

    /// Load envelopes and stash log from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: EnvelopeData = self.file.load()?;

        let fresh = EnvelopeState {
            envelopes: file_data
                .envelopes
                .into_iter()
                .map(|e| (e.id, e))
                .collect(),
            stashes: file_data.stashes,
        };

        *write_lock(&self.state)? = fresh;
        Ok(())
    }

    /// Save envelopes and stash log to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let state = read_lock(&self.state)?;
        self.file.store(&state.to_data())
    }

    /// Persist a staged state, then publish it in memory
    fn publish(&self, current: &mut EnvelopeState, staged: EnvelopeState) -> Result<(), LedgerError> {
        self.file.store(&staged.to_data())?;
        *current = staged;
        Ok(())
    }

    /// Get an envelope by ID
    pub fn get(&self, id: EnvelopeId) -> Result<Option<Envelope>, LedgerError> {
        let state = read_lock(&self.state)?;
        Ok(state.envelopes.get(&id).cloned())
    }

    /// All envelopes, Available first then by name
    pub fn get_all(&self) -> Result<Vec<Envelope>, LedgerError> {
        let state = read_lock(&self.state)?;
        Ok(sorted_envelopes(state.envelopes.values().cloned().collect()))
    }

    /// The envelope tagged as Available, if one exists
    pub fn get_available(&self) -> Result<Option<Envelope>, LedgerError> {
        let state = read_lock(&self.state)?;
        Ok(state.envelopes.values().find(|e| e.is_available()).cloned())
    }

    /// Get an envelope by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Envelope>, LedgerError> {
        let state = read_lock(&self.state)?;

        let name_lower = name.to_lowercase();
        Ok(state
            .envelopes
            .values()
            .find(|e| e.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Check if an envelope name is already taken
    pub fn name_exists(&self, name: &str) -> Result<bool, LedgerError> {
        Ok(self.get_by_name(name)?.is_some())
    }

    /// Add an envelope and persist it
    pub fn insert(&self, envelope: Envelope) -> Result<(), LedgerError> {
        self.insert_many(vec![envelope])
    }

    /// Add several envelopes with one file write. Either all of them are
    /// saved or none are.
    pub fn insert_many(&self, envelopes: Vec<Envelope>) -> Result<(), LedgerError> {
        let mut state = write_lock(&self.state)?;

        let existing = state.envelopes.values().filter(|e| e.is_available()).count();
        let added = envelopes.iter().filter(|e| e.is_available()).count();
        if existing + added > 1 {
            return Err(LedgerError::Duplicate {
                entity_type: "Envelope",
                identifier: "Available".into(),
            });
        }

        let mut staged = state.clone();
        staged
            .envelopes
            .extend(envelopes.into_iter().map(|e| (e.id, e)));
        self.publish(&mut state, staged)
    }

    /// Remove an envelope and persist. Stash records that reference it stay.
    pub fn delete(&self, id: EnvelopeId) -> Result<Option<Envelope>, LedgerError> {
        let mut state = write_lock(&self.state)?;

        let mut staged = state.clone();
        let removed = staged.envelopes.remove(&id);
        if removed.is_some() {
            self.publish(&mut state, staged)?;
        }
        Ok(removed)
    }

    /// Commit a stash as one unit of work.
    ///
    /// Under a single write lock: resolve both envelopes, check the expected
    /// versions, stage the log append and both balance changes on a copy,
    /// write the copy with one atomic file write, and only then swap it in.
    /// On any error neither the file nor the in-memory state changes.
    pub fn commit_stash(
        &self,
        stash: Stash,
        expected: ExpectedVersions,
    ) -> Result<StashOutcome, LedgerError> {
        let mut state = write_lock(&self.state)?;

        for (id, version) in [(stash.from, expected.from), (stash.to, expected.to)] {
            let envelope = state
                .envelopes
                .get(&id)
                .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;

            if let Some(expected) = version {
                if envelope.version != expected {
                    return Err(LedgerError::Conflict {
                        entity_type: "Envelope",
                        identifier: envelope.name.clone(),
                        expected,
                        found: envelope.version,
                    });
                }
            }
        }

        let mut staged = state.clone();
        staged.stashes.push(stash.clone());
        adjust(&mut staged, stash.from, -stash.amount)?;
        adjust(&mut staged, stash.to, stash.amount)?;

        let from = snapshot(&staged, stash.from)?;
        let to = snapshot(&staged, stash.to)?;

        self.publish(&mut state, staged)?;

        Ok(StashOutcome { stash, from, to })
    }

    /// The full stash log, oldest first
    pub fn stashes(&self) -> Result<Vec<Stash>, LedgerError> {
        Ok(read_lock(&self.state)?.stashes.clone())
    }

    /// Stash records moving money in or out of one envelope, oldest first
    pub fn stashes_for(&self, envelope_id: EnvelopeId) -> Result<Vec<Stash>, LedgerError> {
        let state = read_lock(&self.state)?;
        Ok(state
            .stashes
            .iter()
            .filter(|s| s.touches(envelope_id))
            .cloned()
            .collect())
    }

    /// Sum of every stash's effect on one envelope
    pub fn net_stashed(&self, envelope_id: EnvelopeId) -> Result<Money, LedgerError> {
        let state = read_lock(&self.state)?;
        Ok(state.stashes.iter().map(|s| s.net_for(envelope_id)).sum())
    }

    /// Number of stash records
    pub fn stash_count(&self) -> Result<usize, LedgerError> {
        Ok(read_lock(&self.state)?.stashes.len())
    }

    /// Count envelopes
    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(read_lock(&self.state)?.envelopes.len())
    }
}

fn adjust(state: &mut EnvelopeState, id: EnvelopeId, delta: Money) -> Result<(), LedgerError> {
    state
        .envelopes
        .get_mut(&id)
        .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?
        .adjust(delta);
    Ok(())
}

fn snapshot(state: &EnvelopeState, id: EnvelopeId) -> Result<Envelope, LedgerError> {
    state
        .envelopes
        .get(&id)
        .cloned()
        .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))
}
