//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json. An
//! account → transaction index is rebuilt from entries on load and kept
//! current on every append.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{AccountId, Transaction, TransactionId};

use super::file_io::JsonFile;
use super::{read_lock, write_lock};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct TransactionState {
    by_id: HashMap<TransactionId, Transaction>,
    /// Index: account_id -> transaction_ids
    by_account: HashMap<AccountId, Vec<TransactionId>>,
}

impl TransactionState {
    fn index(&mut self, txn: Transaction) {
        for account_id in txn.account_ids() {
            self.by_account.entry(account_id).or_default().push(txn.id);
        }
        self.by_id.insert(txn.id, txn);
    }

    fn sorted(&self) -> Vec<Transaction> {
        let mut transactions: Vec<_> = self.by_id.values().cloned().collect();
        sort_ledger_order(&mut transactions);
        transactions
    }
}

/// Ascending by date, ties broken by creation time
pub fn sort_ledger_order(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    file: JsonFile,
    state: RwLock<TransactionState>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
            state: RwLock::new(TransactionState::default()),
        }
    }

    /// Load transactions from disk and build indexes
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TransactionData = self.file.load()?;

        let mut fresh = TransactionState::default();
        for txn in file_data.transactions {
            fresh.index(txn);
        }

        *write_lock(&self.state)? = fresh;
        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let state = read_lock(&self.state)?;
        self.file.store(&TransactionData {
            transactions: state.sorted(),
        })
    }

    /// Append a transaction and persist it.
    ///
    /// The file is written before the in-memory state changes, so a failed
    /// write leaves the repository exactly as it was.
    pub fn append(&self, txn: Transaction) -> Result<(), LedgerError> {
        let mut state = write_lock(&self.state)?;

        if state.by_id.contains_key(&txn.id) {
            return Err(LedgerError::Duplicate {
                entity_type: "Transaction",
                identifier: txn.id.to_string(),
            });
        }

        let mut transactions = state.sorted();
        transactions.push(txn.clone());
        sort_ledger_order(&mut transactions);
        self.file.store(&TransactionData { transactions })?;

        state.index(txn);
        Ok(())
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        let state = read_lock(&self.state)?;
        Ok(state.by_id.get(&id).cloned())
    }

    /// Get all transactions in ledger order
    pub fn get_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(read_lock(&self.state)?.sorted())
    }

    /// Transactions with at least one entry on the account, in ledger order
    pub fn get_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        let state = read_lock(&self.state)?;

        let ids = state
            .by_account
            .get(&account_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut transactions: Vec<_> = ids
            .iter()
            .filter_map(|id| state.by_id.get(id).cloned())
            .collect();
        sort_ledger_order(&mut transactions);
        Ok(transactions)
    }

    /// Number of transactions referencing an account
    pub fn count_for_account(&self, account_id: AccountId) -> Result<usize, LedgerError> {
        let state = read_lock(&self.state)?;
        Ok(state.by_account.get(&account_id).map_or(0, Vec::len))
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(read_lock(&self.state)?.by_id.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, Money};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path);
        (temp_dir, repo)
    }

    fn transfer(date: NaiveDate, from: AccountId, to: AccountId, cents: i64) -> Transaction {
        Transaction::new(
            date,
            "",
            vec![
                Entry::new(to, Money::from_cents(cents)),
                Entry::new(from, Money::from_cents(-cents)),
            ],
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_append_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = transfer(day(15), AccountId::new(), AccountId::new(), 5000);
        let id = txn.id;

        repo.append(txn).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.entries.len(), 2);
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = transfer(day(1), AccountId::new(), AccountId::new(), 100);

        repo.append(txn.clone()).unwrap();
        let err = repo.append(txn).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_by_account_is_ascending() {
        let (_temp_dir, repo) = create_test_repo();
        let cash = AccountId::new();
        let income = AccountId::new();
        let other = AccountId::new();

        repo.append(transfer(day(20), income, cash, 300)).unwrap();
        repo.append(transfer(day(5), income, cash, 100)).unwrap();
        repo.append(transfer(day(10), income, other, 200)).unwrap();

        let cash_txns = repo.get_by_account(cash).unwrap();
        let dates: Vec<_> = cash_txns.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![day(5), day(20)]);

        assert_eq!(repo.get_by_account(income).unwrap().len(), 3);
        assert!(repo.get_by_account(AccountId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_account_indexed_once_per_transaction() {
        let (_temp_dir, repo) = create_test_repo();
        let cash = AccountId::new();
        let food = AccountId::new();
        let txn = Transaction::new(
            day(2),
            "split",
            vec![
                Entry::new(food, Money::from_cents(60)),
                Entry::new(food, Money::from_cents(40)),
                Entry::new(cash, Money::from_cents(-100)),
            ],
        );
        repo.append(txn).unwrap();

        assert_eq!(repo.get_by_account(food).unwrap().len(), 1);
        assert_eq!(repo.count_for_account(food).unwrap(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let cash = AccountId::new();
        let txn = transfer(day(15), AccountId::new(), cash, 5000);
        let id = txn.id;

        repo.append(txn).unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.count().unwrap(), 1);
        assert_eq!(repo2.get(id).unwrap().unwrap().amount_for(cash).cents(), 5000);
        assert_eq!(repo2.get_by_account(cash).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_append_leaves_state_untouched() {
        let (temp_dir, repo) = create_test_repo();
        fs::create_dir(temp_dir.path().join("transactions.json.tmp")).unwrap();

        let cash = AccountId::new();
        let result = repo.append(transfer(day(1), AccountId::new(), cash, 100));

        assert!(result.is_err());
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.get_by_account(cash).unwrap().is_empty());
    }
}
