//! Transaction model
//!
//! A transaction is a dated event with a free-text note and an ordered list of
//! entries. Entries post signed amounts against accounts and must sum to zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, TransactionId};
use super::money::Money;

/// A single posting against one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The account this entry posts to
    pub account_id: AccountId,

    /// Signed amount (positive debits the account)
    pub amount: Money,
}

impl Entry {
    pub fn new(account_id: AccountId, amount: Money) -> Self {
        Self { account_id, amount }
    }
}

/// A ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Transaction date
    pub date: NaiveDate,

    /// Free-text note
    #[serde(default)]
    pub note: String,

    /// Postings, in the order they were entered
    pub entries: Vec<Entry>,

    /// When the transaction was recorded
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(date: NaiveDate, note: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            note: note.into(),
            entries,
            created_at: Utc::now(),
        }
    }

    /// Sum of all entry amounts; zero for a balanced transaction
    pub fn total(&self) -> Money {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Whether any entry posts to the given account
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.entries.iter().any(|e| e.account_id == account_id)
    }

    /// Net amount this transaction posts to one account
    pub fn amount_for(&self, account_id: AccountId) -> Money {
        self.entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .map(|e| e.amount)
            .sum()
    }

    /// Distinct accounts referenced by this transaction, in entry order
    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !ids.contains(&entry.account_id) {
                ids.push(entry.account_id);
            }
        }
        ids
    }

    /// Validate double-entry balancing
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.entries.is_empty() {
            return Err(TransactionValidationError::NoEntries);
        }

        if let Some(index) = self.entries.iter().position(|e| e.amount.is_zero()) {
            return Err(TransactionValidationError::ZeroAmountEntry { index });
        }

        let total = self.total();
        if !total.is_zero() {
            return Err(TransactionValidationError::Unbalanced { imbalance: total });
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} entries)",
            self.date.format("%Y-%m-%d"),
            self.note,
            self.entries.len()
        )
    }
}

/// Reasons a transaction is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NoEntries,
    ZeroAmountEntry { index: usize },
    Unbalanced { imbalance: Money },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEntries => write!(f, "Transaction must have at least one entry"),
            Self::ZeroAmountEntry { index } => {
                write!(f, "Entry {} has a zero amount", index + 1)
            }
            Self::Unbalanced { imbalance } => {
                write!(f, "Entries do not sum to zero (off by {})", imbalance)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}
