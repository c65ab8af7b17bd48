//! Stash service
//!
//! Moves budgeted money from one envelope to another. The stash record and
//! both balance changes commit together through
//! [`EnvelopeRepository::commit_stash`](crate::storage::EnvelopeRepository::commit_stash).

use crate::audit::AuditEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Envelope, EnvelopeId, Money, Stash};
use crate::storage::{ExpectedVersions, StashOutcome, Storage};

/// A request to move `amount` from one envelope to another
#[derive(Debug, Clone, Copy)]
pub struct StashRequest {
    pub from: EnvelopeId,
    pub to: EnvelopeId,
    /// May be negative, which moves money the other way
    pub amount: Money,
    pub expected: ExpectedVersions,
}

impl StashRequest {
    /// A request with no version expectations
    pub fn new(from: EnvelopeId, to: EnvelopeId, amount: Money) -> Self {
        Self {
            from,
            to,
            amount,
            expected: ExpectedVersions::default(),
        }
    }

    /// A request that fails with a conflict if either envelope changed since
    /// these snapshots were read
    pub fn from_snapshots(from: &Envelope, to: &Envelope, amount: Money) -> Self {
        Self {
            from: from.id,
            to: to.id,
            amount,
            expected: ExpectedVersions {
                from: Some(from.version),
                to: Some(to.version),
            },
        }
    }
}

/// Service for moving money between envelopes
pub struct StashService<'a> {
    storage: &'a Storage,
}

impl<'a> StashService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Commit a stash.
    ///
    /// Zero amounts and same-envelope stashes are rejected before anything is
    /// written. Unknown envelopes fail with `NotFound`, stale expected
    /// versions with `Conflict`.
    pub fn stash(&self, request: StashRequest) -> LedgerResult<StashOutcome> {
        if request.amount.is_zero() {
            return Err(LedgerError::Validation(
                "Stash amount must be non-zero".into(),
            ));
        }

        if request.from == request.to {
            return Err(LedgerError::Validation(
                "Cannot stash into the same envelope".into(),
            ));
        }

        let stash = Stash::new(request.from, request.to, request.amount);
        let outcome = self.storage.envelopes.commit_stash(stash, request.expected)?;

        tracing::info!(
            from = %outcome.from.name,
            to = %outcome.to.name,
            amount = %outcome.stash.amount,
            "stash committed"
        );

        self.storage.record(AuditEntry::stash_committed(
            &outcome.stash,
            &outcome.from,
            &outcome.to,
        ));

        Ok(outcome)
    }

    /// The stash log, optionally limited to one envelope, oldest first
    pub fn list(&self, envelope: Option<EnvelopeId>) -> LedgerResult<Vec<Stash>> {
        match envelope {
            Some(id) => self.storage.envelopes.stashes_for(id),
            None => self.storage.envelopes.stashes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Action, Subject};
    use crate::config::paths::LedgerPaths;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn envelopes(storage: &Storage) -> (Envelope, Envelope) {
        let available = Envelope::available("Available");
        let groceries = Envelope::new("Groceries");
        storage.envelopes.insert(available.clone()).unwrap();
        storage.envelopes.insert(groceries.clone()).unwrap();
        (available, groceries)
    }

    #[test]
    fn test_stash_conserves_money() {
        let (_temp_dir, storage) = create_test_storage();
        let (available, groceries) = envelopes(&storage);
        let service = StashService::new(&storage);

        let outcome = service
            .stash(StashRequest::new(
                available.id,
                groceries.id,
                Money::from_cents(4000),
            ))
            .unwrap();

        assert_eq!(outcome.from.amount, available.amount - Money::from_cents(4000));
        assert_eq!(outcome.to.amount, groceries.amount + Money::from_cents(4000));
        assert_eq!(service.list(None).unwrap().len(), 1);
    }

    #[test]
    fn test_negative_stash_moves_money_back() {
        let (_temp_dir, storage) = create_test_storage();
        let (available, groceries) = envelopes(&storage);
        let service = StashService::new(&storage);

        let outcome = service
            .stash(StashRequest::new(
                available.id,
                groceries.id,
                Money::from_cents(-1500),
            ))
            .unwrap();

        assert_eq!(outcome.from.amount.cents(), 1500);
        assert_eq!(outcome.to.amount.cents(), -1500);
    }

    #[test]
    fn test_zero_and_self_stash_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let (available, groceries) = envelopes(&storage);
        let service = StashService::new(&storage);

        let err = service
            .stash(StashRequest::new(available.id, groceries.id, Money::zero()))
            .unwrap_err();
        assert!(err.is_validation());

        let err = service
            .stash(StashRequest::new(
                groceries.id,
                groceries.id,
                Money::from_cents(100),
            ))
            .unwrap_err();
        assert!(err.is_validation());

        assert!(service.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_envelope_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let (available, _) = envelopes(&storage);

        let err = StashService::new(&storage)
            .stash(StashRequest::new(
                available.id,
                EnvelopeId::new(),
                Money::from_cents(100),
            ))
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_stale_snapshot_conflicts() {
        let (_temp_dir, storage) = create_test_storage();
        let (available, groceries) = envelopes(&storage);
        let service = StashService::new(&storage);

        let stale = StashRequest::from_snapshots(&available, &groceries, Money::from_cents(100));
        service.stash(stale).unwrap();

        let err = service.stash(stale).unwrap_err();
        assert!(err.is_conflict());
        assert!(err.is_retryable());
        assert_eq!(service.list(None).unwrap().len(), 1);

        // Re-reading the envelopes makes the retry succeed
        let from = storage.envelopes.get(available.id).unwrap().unwrap();
        let to = storage.envelopes.get(groceries.id).unwrap().unwrap();
        service
            .stash(StashRequest::from_snapshots(&from, &to, Money::from_cents(100)))
            .unwrap();
        assert_eq!(service.list(Some(groceries.id)).unwrap().len(), 2);
    }

    #[test]
    fn test_stash_is_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let (available, groceries) = envelopes(&storage);

        StashService::new(&storage)
            .stash(StashRequest::new(
                available.id,
                groceries.id,
                Money::from_cents(100),
            ))
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, Action::Stashed);
        assert!(matches!(
            entries[0].subject,
            Subject::Stash { from, to, .. } if from == available.id && to == groceries.id
        ));
        assert_eq!(entries[0].amount, Some(Money::from_cents(100)));
    }

    #[test]
    fn test_audit_failure_does_not_undo_stash() {
        let (temp_dir, storage) = create_test_storage();
        let (available, groceries) = envelopes(&storage);
        fs::create_dir(temp_dir.path().join("audit.log")).unwrap();

        let outcome = StashService::new(&storage).stash(StashRequest::new(
            available.id,
            groceries.id,
            Money::from_cents(100),
        ));

        assert!(outcome.is_ok());
        assert_eq!(storage.envelopes.stash_count().unwrap(), 1);
    }
}
