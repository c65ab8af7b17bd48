//! Transaction service
//!
//! Records balanced transactions and lists them. Transactions are immutable
//! once written.

use chrono::NaiveDate;

use crate::audit::AuditEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccountId, Entry, Transaction, TransactionId};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only transactions touching this account
    pub account_id: Option<AccountId>,
    /// Filter by date range start (inclusive)
    pub start_date: Option<NaiveDate>,
    /// Filter by date range end (inclusive)
    pub end_date: Option<NaiveDate>,
    /// Keep only the most recent N
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        self.start_date.map_or(true, |start| txn.date >= start)
            && self.end_date.map_or(true, |end| txn.date <= end)
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub date: NaiveDate,
    pub note: String,
    pub entries: Vec<Entry>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a transaction.
    ///
    /// Rejected before anything is written when it has no entries, has a
    /// zero entry, does not sum to zero, or posts to an unknown account.
    pub fn create(&self, input: CreateTransactionInput) -> LedgerResult<Transaction> {
        let txn = Transaction::new(input.date, input.note.trim(), input.entries);
        txn.validate()?;

        let known = self.storage.accounts.get_many(txn.account_ids())?;
        if let Some(missing) = txn.account_ids().into_iter().find(|id| !known.contains_key(id)) {
            return Err(LedgerError::account_not_found(missing.to_string()));
        }

        self.storage.transactions.append(txn.clone())?;

        self.storage.record(AuditEntry::transaction_recorded(&txn));

        tracing::info!(
            transaction = %txn.id,
            date = %txn.date,
            entries = txn.entries.len(),
            "transaction recorded"
        );
        Ok(txn)
    }

    /// Transactions matching the filter, oldest first
    pub fn list(&self, filter: TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        let transactions = match filter.account_id {
            Some(account_id) => self.storage.transactions.get_by_account(account_id)?,
            None => self.storage.transactions.get_all()?,
        };

        let mut transactions: Vec<_> = transactions
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();

        if let Some(limit) = filter.limit {
            let start = transactions.len().saturating_sub(limit);
            transactions.drain(..start);
        }

        Ok(transactions)
    }

    /// Find a transaction by full UUID or by its short display form
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Transaction>> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self.storage.transactions.get(id);
        }

        let mut matches = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .filter(|t| t.id.to_string() == identifier);

        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(Some(txn)),
            (Some(_), Some(_)) => Err(LedgerError::Validation(format!(
                "Transaction ID '{}' is ambiguous; use the full ID",
                identifier
            ))),
            _ => Ok(None),
        }
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.transactions.count()
    }
}
