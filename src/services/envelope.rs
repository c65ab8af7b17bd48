//! Envelope service
//!
//! Creation, lookup and deletion of envelopes. Envelope amounts only change
//! through stashes; see [`StashService`](super::StashService).

use crate::audit::AuditEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Envelope, EnvelopeId, Stash};
use crate::storage::Storage;

/// Service for envelope management
pub struct EnvelopeService<'a> {
    storage: &'a Storage,
}

impl<'a> EnvelopeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an ordinary envelope with a zero balance
    pub fn create(&self, name: &str) -> LedgerResult<Envelope> {
        let name = name.trim();

        if self.storage.envelopes.name_exists(name)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Envelope",
                identifier: name.to_string(),
            });
        }

        let envelope = Envelope::new(name);
        envelope
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.envelopes.insert(envelope.clone())?;

        self.storage.record(AuditEntry::envelope_created(&envelope));

        tracing::info!(envelope = %envelope.name, "envelope created");
        Ok(envelope)
    }

    /// Find an envelope by name or ID string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Envelope>> {
        if let Some(envelope) = self.storage.envelopes.get_by_name(identifier)? {
            return Ok(Some(envelope));
        }

        if let Ok(id) = identifier.parse::<EnvelopeId>() {
            return self.storage.envelopes.get(id);
        }

        Ok(None)
    }

    /// Like [`find`](Self::find), but a miss is a `NotFound` error
    pub fn require(&self, identifier: &str) -> LedgerResult<Envelope> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::envelope_not_found(identifier))
    }

    /// Available first, then ordinary envelopes by name
    pub fn list(&self) -> LedgerResult<Vec<Envelope>> {
        self.storage.envelopes.get_all()
    }

    pub fn get_available(&self) -> LedgerResult<Option<Envelope>> {
        self.storage.envelopes.get_available()
    }

    /// Stash log, optionally limited to one envelope
    pub fn get_stashes(&self, envelope: Option<EnvelopeId>) -> LedgerResult<Vec<Stash>> {
        match envelope {
            Some(id) => self.storage.envelopes.stashes_for(id),
            None => self.storage.envelopes.stashes(),
        }
    }

    /// Delete an ordinary envelope.
    ///
    /// Accounts bound to it keep their binding and its stash records stay in
    /// the log. The Available envelope cannot be deleted.
    pub fn delete(&self, id: EnvelopeId) -> LedgerResult<Envelope> {
        let envelope = self
            .storage
            .envelopes
            .get(id)?
            .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;

        if envelope.is_available() {
            return Err(LedgerError::Validation(format!(
                "'{}' holds unallocated funds and cannot be deleted",
                envelope.name
            )));
        }

        let removed = self
            .storage
            .envelopes
            .delete(id)?
            .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;

        self.storage.record(AuditEntry::envelope_deleted(&removed));

        let bound = self.storage.accounts.get_bound_to(id)?.len();
        if bound > 0 {
            tracing::warn!(
                envelope = %removed.name,
                accounts = bound,
                "deleted envelope still has bound accounts"
            );
        }
        tracing::info!(envelope = %removed.name, "envelope deleted");
        Ok(removed)
    }
}
