//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to accounts.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Account, AccountId, EnvelopeId};

use super::file_io::JsonFile;
use super::{read_lock, write_lock};

/// Serializable account data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AccountData {
    accounts: Vec<Account>,
}

/// Repository for account persistence
pub struct AccountRepository {
    file: JsonFile,
    data: RwLock<HashMap<AccountId, Account>>,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load accounts from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: AccountData = self.file.load()?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for account in file_data.accounts {
            data.insert(account.id, account);
        }

        Ok(())
    }

    /// Save accounts to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = read_lock(&self.data)?;

        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));

        self.file.store(&AccountData { accounts })
    }

    /// Get an account by ID
    pub fn get(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Resolve a set of IDs in one pass; IDs without an account are left out
    pub fn get_many(
        &self,
        ids: impl IntoIterator<Item = AccountId>,
    ) -> Result<HashMap<AccountId, Account>, LedgerError> {
        let data = read_lock(&self.data)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| data.get(&id).map(|a| (id, a.clone())))
            .collect())
    }

    /// Get all accounts, sorted by name
    pub fn get_all(&self) -> Result<Vec<Account>, LedgerError> {
        let data = read_lock(&self.data)?;

        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    /// Snapshot of every account keyed by ID
    pub fn get_map(&self) -> Result<HashMap<AccountId, Account>, LedgerError> {
        Ok(read_lock(&self.data)?.clone())
    }

    /// Accounts bound to an envelope, sorted by name
    pub fn get_bound_to(&self, envelope_id: EnvelopeId) -> Result<Vec<Account>, LedgerError> {
        let data = read_lock(&self.data)?;

        let mut accounts: Vec<_> = data
            .values()
            .filter(|a| a.is_bound_to(envelope_id))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    /// Get an account by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Account>, LedgerError> {
        let data = read_lock(&self.data)?;

        let name_lower = name.to_lowercase();
        Ok(data
            .values()
            .find(|a| a.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Insert or update an account
    pub fn upsert(&self, account: Account) -> Result<(), LedgerError> {
        let mut data = write_lock(&self.data)?;
        data.insert(account.id, account);
        Ok(())
    }

    /// Delete an account
    pub fn delete(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        let mut data = write_lock(&self.data)?;
        Ok(data.remove(&id))
    }

    /// Check if an account exists
    pub fn exists(&self, id: AccountId) -> Result<bool, LedgerError> {
        let data = read_lock(&self.data)?;
        Ok(data.contains_key(&id))
    }

    /// Check if an account name is already taken
    pub fn name_exists(
        &self,
        name: &str,
        exclude_id: Option<AccountId>,
    ) -> Result<bool, LedgerError> {
        let data = read_lock(&self.data)?;

        let name_lower = name.to_lowercase();
        Ok(data
            .values()
            .any(|a| a.name.to_lowercase() == name_lower && Some(a.id) != exclude_id))
    }

    /// Count accounts
    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, AccountRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");
        let repo = AccountRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let account = Account::new("assets:checking");
        let id = account.id;
        repo.upsert(account).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.name, "assets:checking");
        assert!(repo.get(AccountId::new()).unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();

        let envelope = EnvelopeId::new();
        let account = Account::bound("expenses:food", envelope);
        let id = account.id;

        repo.load().unwrap();
        repo.upsert(account).unwrap();
        repo.save().unwrap();

        let repo2 = AccountRepository::new(temp_dir.path().join("accounts.json"));
        repo2.load().unwrap();

        let retrieved = repo2.get(id).unwrap().unwrap();
        assert_eq!(retrieved.bound_to, Some(envelope));
    }

    #[test]
    fn test_get_bound_to() {
        let (_temp_dir, repo) = create_test_repo();
        let groceries = EnvelopeId::new();
        let rent = EnvelopeId::new();

        repo.upsert(Account::bound("food", groceries)).unwrap();
        repo.upsert(Account::bound("dining", groceries)).unwrap();
        repo.upsert(Account::bound("landlord", rent)).unwrap();
        repo.upsert(Account::new("assets:cash")).unwrap();

        let bound = repo.get_bound_to(groceries).unwrap();
        let names: Vec<_> = bound.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["dining", "food"]);

        assert!(repo.get_bound_to(EnvelopeId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_get_many_skips_missing() {
        let (_temp_dir, repo) = create_test_repo();
        let cash = Account::new("assets:cash");
        let cash_id = cash.id;
        repo.upsert(cash).unwrap();

        let missing = AccountId::new();
        let found = repo.get_many([cash_id, missing]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&cash_id));
    }

    #[test]
    fn test_get_by_name() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Account::new("Assets:Cash")).unwrap();

        let found = repo.get_by_name("assets:cash").unwrap();
        assert_eq!(found.unwrap().name, "Assets:Cash");
        assert!(repo.get_by_name("other").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let account = Account::new("Test");
        let id = account.id;

        repo.upsert(account).unwrap();
        assert!(repo.exists(id).unwrap());

        let removed = repo.delete(id).unwrap();
        assert_eq!(removed.map(|a| a.id), Some(id));
        assert!(!repo.exists(id).unwrap());
        assert!(repo.delete(id).unwrap().is_none());
    }

    #[test]
    fn test_name_exists() {
        let (_temp_dir, repo) = create_test_repo();
        let account = Account::new("assets:savings");
        let id = account.id;
        repo.upsert(account).unwrap();

        assert!(repo.name_exists("ASSETS:SAVINGS", None).unwrap());
        assert!(!repo.name_exists("assets:savings", Some(id)).unwrap());
        assert!(!repo.name_exists("other", None).unwrap());
    }
}
