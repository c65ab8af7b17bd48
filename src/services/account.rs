//! Account service
//!
//! Creation, binding and deletion of ledger accounts. Deleting an account
//! never touches the transactions that reference it.

use crate::audit::AuditEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountId, EnvelopeId};
use crate::storage::Storage;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

impl<'a> AccountService<'a> {
    /// Create a new account service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account, optionally bound to an envelope
    pub fn create(&self, name: &str, bound_to: Option<EnvelopeId>) -> LedgerResult<Account> {
        let name = name.trim();

        if self.storage.accounts.name_exists(name, None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        if let Some(envelope_id) = bound_to {
            self.require_envelope(envelope_id)?;
        }

        let mut account = Account::new(name);
        account.bound_to = bound_to;
        account
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        self.storage.record(AuditEntry::account_created(&account));

        tracing::info!(account = %account.name, "account created");
        Ok(account)
    }

    /// Find an account by name or ID string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Account>> {
        if let Some(account) = self.storage.accounts.get_by_name(identifier)? {
            return Ok(Some(account));
        }

        if let Ok(id) = identifier.parse::<AccountId>() {
            return self.storage.accounts.get(id);
        }

        Ok(None)
    }

    /// Like [`find`](Self::find), but a miss is a `NotFound` error
    pub fn require(&self, identifier: &str) -> LedgerResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::account_not_found(identifier))
    }

    /// All accounts, sorted by name
    pub fn list(&self) -> LedgerResult<Vec<Account>> {
        self.storage.accounts.get_all()
    }

    /// Set or clear an account's envelope binding
    pub fn bind(&self, id: AccountId, envelope: Option<EnvelopeId>) -> LedgerResult<Account> {
        let mut account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;

        let envelope_name = match envelope {
            Some(envelope_id) => Some(self.require_envelope(envelope_id)?.name),
            None => None,
        };

        let previous = account.bound_to;
        account.bind(envelope);

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        self.storage.record(AuditEntry::account_rebound(
            &account,
            format!(
                "bound_to: {} -> {}",
                describe_binding(previous),
                envelope_name.as_deref().unwrap_or("none")
            ),
        ));

        tracing::info!(
            account = %account.name,
            envelope = envelope_name.as_deref().unwrap_or("none"),
            "account binding changed"
        );
        Ok(account)
    }

    /// Delete an account. Entries that reference it are left in place.
    pub fn delete(&self, id: AccountId) -> LedgerResult<Account> {
        let account = self
            .storage
            .accounts
            .delete(id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;
        self.storage.accounts.save()?;

        let orphaned = self.storage.transactions.count_for_account(id)?;

        self.storage.record(AuditEntry::account_deleted(&account));

        if orphaned > 0 {
            tracing::warn!(
                account = %account.name,
                transactions = orphaned,
                "deleted account is still referenced by transactions"
            );
        }
        tracing::info!(account = %account.name, "account deleted");
        Ok(account)
    }

    fn require_envelope(&self, id: EnvelopeId) -> LedgerResult<crate::models::Envelope> {
        self.storage
            .envelopes
            .get(id)?
            .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))
    }
}

fn describe_binding(binding: Option<EnvelopeId>) -> String {
    binding.map_or_else(|| "none".to_string(), |id| id.to_string())
}
