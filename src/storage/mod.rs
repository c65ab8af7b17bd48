//! Storage layer for the ledger
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Each repository keeps its rows in memory behind a `RwLock`, so
//! read queries can run side by side while writes are serialized.

pub mod accounts;
pub mod envelopes;
pub mod file_io;
pub mod init;
pub mod transactions;

pub use accounts::AccountRepository;
pub use envelopes::{EnvelopeRepository, ExpectedVersions, StashOutcome};
pub use file_io::{FileStatus, JsonFile};
pub use init::seed_if_empty;
pub use transactions::TransactionRepository;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, LedgerError> {
    lock.read()
        .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, LedgerError> {
    lock.write()
        .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    pub envelopes: EnvelopeRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            envelopes: EnvelopeRepository::new(paths.envelopes_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.accounts.load()?;
        self.transactions.load()?;
        self.envelopes.load()?;
        tracing::debug!(
            accounts = self.accounts.count()?,
            transactions = self.transactions.count()?,
            envelopes = self.envelopes.count()?,
            "ledger loaded"
        );
        Ok(())
    }

    /// True when there are no accounts and no envelopes
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.accounts.count()? == 0 && self.envelopes.count()? == 0)
    }

    /// Audit a change that is already saved.
    ///
    /// A failed audit write is logged at `warn`; the saved change stands.
    pub fn record(&self, entry: AuditEntry) {
        self.record_all(std::slice::from_ref(&entry));
    }

    /// Audit several saved changes with one log append
    pub fn record_all(&self, entries: &[AuditEntry]) {
        if let Err(e) = self.audit.log_batch(entries) {
            tracing::warn!(
                error = %e,
                entries = entries.len(),
                "failed to write audit log, change is already saved"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Envelope};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_test_storage();

        assert!(temp_dir.path().join("data").exists());
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_saved_data_reloads() {
        let (temp_dir, storage) = create_test_storage();
        storage.accounts.upsert(Account::new("assets:cash")).unwrap();
        storage.envelopes.insert(Envelope::new("Groceries")).unwrap();
        storage.accounts.save().unwrap();

        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut reopened = Storage::new(paths).unwrap();
        reopened.load_all().unwrap();

        assert!(!reopened.is_empty().unwrap());
        assert_eq!(reopened.accounts.count().unwrap(), 1);
        assert_eq!(reopened.envelopes.count().unwrap(), 1);
    }

    #[test]
    fn test_record_appends_to_audit_log() {
        let (_temp_dir, storage) = create_test_storage();
        let account = Account::new("assets:cash");

        storage.record(AuditEntry::account_created(&account));

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject.kind(), "account");
    }

    #[test]
    fn test_record_survives_unwritable_audit_log() {
        let (temp_dir, storage) = create_test_storage();
        std::fs::create_dir(temp_dir.path().join("audit.log")).unwrap();

        storage.record_all(&[
            AuditEntry::account_created(&Account::new("assets:cash")),
            AuditEntry::envelope_created(&Envelope::new("Rent")),
        ]);

        assert!(storage.audit().read_all().is_err());
    }
}
