//! Ledger queries
//!
//! Read access to accounts, transactions and envelopes, plus the balance and
//! spending aggregations. Aggregations re-scan every entry on each call; no
//! running totals are cached.
//!
//! Missing rows are reported as `None` or an empty collection. Entries whose
//! account has been deleted are skipped with a warning rather than failing
//! the whole query.

use std::collections::HashMap;

use crate::error::LedgerResult;
use crate::models::{
    Account, AccountId, Envelope, EnvelopeId, Money, Transaction, TransactionId,
};
use crate::storage::Storage;

/// An account with its binding resolved
#[derive(Debug, Clone)]
pub struct AccountView {
    pub account: Account,
    /// The bound envelope, `None` when unbound or when the binding dangles
    pub envelope: Option<Envelope>,
}

impl AccountView {
    /// Bound to an envelope that no longer exists
    pub fn binding_dangles(&self) -> bool {
        self.account.bound_to.is_some() && self.envelope.is_none()
    }
}

/// The account behind an entry
#[derive(Debug, Clone)]
pub enum EntryAccount {
    Resolved(Account),
    /// The account was deleted after the entry was written
    Dangling(AccountId),
}

impl EntryAccount {
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Resolved(account) => Some(account),
            Self::Dangling(_) => None,
        }
    }

    pub fn id(&self) -> AccountId {
        match self {
            Self::Resolved(account) => account.id,
            Self::Dangling(id) => *id,
        }
    }
}

/// An entry with its account resolved
#[derive(Debug, Clone)]
pub struct EntryDetail {
    pub account: EntryAccount,
    pub amount: Money,
}

/// A transaction with every entry's account resolved
#[derive(Debug, Clone)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub entries: Vec<EntryDetail>,
}

impl TransactionDetail {
    pub fn dangling_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.account, EntryAccount::Dangling(_)))
            .count()
    }
}

/// Read-side service over the ledger store
pub struct LedgerService<'a> {
    storage: &'a Storage,
}

impl<'a> LedgerService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// An account with its bound envelope
    pub fn get_account(&self, id: AccountId) -> LedgerResult<Option<AccountView>> {
        let Some(account) = self.storage.accounts.get(id)? else {
            return Ok(None);
        };

        let envelope = match account.bound_to {
            Some(envelope_id) => {
                let envelope = self.storage.envelopes.get(envelope_id)?;
                if envelope.is_none() {
                    tracing::warn!(
                        account = %account.name,
                        envelope = %envelope_id,
                        "account bound to missing envelope"
                    );
                }
                envelope
            }
            None => None,
        };

        Ok(Some(AccountView { account, envelope }))
    }

    /// Accounts whose binding is the given envelope
    pub fn get_bound_accounts(&self, envelope_id: EnvelopeId) -> LedgerResult<Vec<Account>> {
        self.storage.accounts.get_bound_to(envelope_id)
    }

    /// A transaction with its entries' accounts resolved in one batch lookup
    pub fn get_transaction(&self, id: TransactionId) -> LedgerResult<Option<TransactionDetail>> {
        let Some(transaction) = self.storage.transactions.get(id)? else {
            return Ok(None);
        };

        let accounts = self.storage.accounts.get_many(transaction.account_ids())?;

        let entries = transaction
            .entries
            .iter()
            .map(|entry| EntryDetail {
                account: match accounts.get(&entry.account_id) {
                    Some(account) => EntryAccount::Resolved(account.clone()),
                    None => EntryAccount::Dangling(entry.account_id),
                },
                amount: entry.amount,
            })
            .collect();

        Ok(Some(TransactionDetail {
            transaction,
            entries,
        }))
    }

    /// Transactions with at least one entry on the account, oldest first
    pub fn get_transactions_with_account(
        &self,
        account_id: AccountId,
    ) -> LedgerResult<Vec<Transaction>> {
        self.storage.transactions.get_by_account(account_id)
    }

    pub fn get_envelope(&self, id: EnvelopeId) -> LedgerResult<Option<Envelope>> {
        self.storage.envelopes.get(id)
    }

    /// Sum of entry amounts per account.
    ///
    /// Only accounts with at least one entry appear; callers fill in zero for
    /// the rest. Entries on deleted accounts are left out.
    pub fn get_account_balances(&self) -> LedgerResult<HashMap<AccountId, Money>> {
        let accounts = self.storage.accounts.get_map()?;
        let mut balances: HashMap<AccountId, Money> = HashMap::new();
        let mut dangling = 0usize;

        for txn in self.storage.transactions.get_all()? {
            for entry in &txn.entries {
                if !accounts.contains_key(&entry.account_id) {
                    dangling += 1;
                    continue;
                }
                *balances.entry(entry.account_id).or_default() += entry.amount;
            }
        }

        if dangling > 0 {
            tracing::warn!(entries = dangling, "skipped entries on deleted accounts");
        }
        tracing::debug!(accounts = balances.len(), "computed account balances");

        Ok(balances)
    }

    /// Sum of entries posted to accounts that no longer exist
    pub fn get_dangling_total(&self) -> LedgerResult<Money> {
        let accounts = self.storage.accounts.get_map()?;
        Ok(self
            .storage
            .transactions
            .get_all()?
            .iter()
            .flat_map(|t| t.entries.iter())
            .filter(|e| !accounts.contains_key(&e.account_id))
            .map(|e| e.amount)
            .sum())
    }

    /// Spending against an envelope: positive entries on its bound accounts.
    /// Negative entries such as refunds do not reduce the total.
    pub fn get_spending_total(&self, envelope_id: EnvelopeId) -> LedgerResult<Money> {
        let bound = self.storage.accounts.get_bound_to(envelope_id)?;

        let mut total = Money::zero();
        for account in &bound {
            for txn in self.storage.transactions.get_by_account(account.id)? {
                total += txn
                    .entries
                    .iter()
                    .filter(|e| e.account_id == account.id)
                    .map(|e| e.amount.positive_part())
                    .sum::<Money>();
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Entry;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn add_account(storage: &Storage, account: Account) -> AccountId {
        let id = account.id;
        storage.accounts.upsert(account).unwrap();
        id
    }

    fn post(storage: &Storage, date: NaiveDate, entries: &[(AccountId, i64)]) -> TransactionId {
        let txn = Transaction::new(
            date,
            "",
            entries
                .iter()
                .map(|(id, cents)| Entry::new(*id, Money::from_cents(*cents)))
                .collect(),
        );
        let id = txn.id;
        storage.transactions.append(txn).unwrap();
        id
    }

    #[test]
    fn test_scenario_balances() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = Envelope::new("Groceries");
        storage.envelopes.insert(groceries.clone()).unwrap();
        let cash = add_account(&storage, Account::new("assets:cash"));
        let food = add_account(&storage, Account::bound("food", groceries.id));

        post(&storage, day(1), &[(cash, 10000), (food, -10000)]);

        let balances = LedgerService::new(&storage).get_account_balances().unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[&cash].cents(), 10000);
        assert_eq!(balances[&food].cents(), -10000);
    }

    #[test]
    fn test_balances_omit_accounts_without_entries() {
        let (_temp_dir, storage) = create_test_storage();
        let cash = add_account(&storage, Account::new("assets:cash"));
        let idle = add_account(&storage, Account::new("assets:savings"));
        let income = add_account(&storage, Account::new("income"));

        post(&storage, day(1), &[(cash, 500), (income, -500)]);
        post(&storage, day(2), &[(cash, 250), (income, -250)]);

        let balances = LedgerService::new(&storage).get_account_balances().unwrap();
        assert_eq!(balances[&cash].cents(), 750);
        assert!(!balances.contains_key(&idle));
    }

    #[test]
    fn test_balances_skip_deleted_accounts() {
        let (_temp_dir, storage) = create_test_storage();
        let cash = add_account(&storage, Account::new("assets:cash"));
        let gone = add_account(&storage, Account::new("income:old"));
        post(&storage, day(1), &[(cash, 700), (gone, -700)]);

        storage.accounts.delete(gone).unwrap();

        let service = LedgerService::new(&storage);
        let balances = service.get_account_balances().unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[&cash].cents(), 700);
        assert_eq!(service.get_dangling_total().unwrap().cents(), -700);
    }

    #[test]
    fn test_spending_total_ignores_negative_entries() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = Envelope::new("Groceries");
        storage.envelopes.insert(groceries.clone()).unwrap();
        let cash = add_account(&storage, Account::new("assets:cash"));
        let food = add_account(&storage, Account::bound("food", groceries.id));

        post(&storage, day(1), &[(food, 5000), (cash, -5000)]);
        post(&storage, day(2), &[(food, -1000), (cash, 1000)]);
        post(&storage, day(3), &[(food, 500), (cash, -500)]);

        let total = LedgerService::new(&storage)
            .get_spending_total(groceries.id)
            .unwrap();
        assert_eq!(total.cents(), 5500);
    }

    #[test]
    fn test_spending_total_across_bound_accounts() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = Envelope::new("Groceries");
        storage.envelopes.insert(groceries.clone()).unwrap();
        let cash = add_account(&storage, Account::new("assets:cash"));
        let food = add_account(&storage, Account::bound("food", groceries.id));
        let market = add_account(&storage, Account::bound("market", groceries.id));
        let rent = add_account(&storage, Account::new("rent"));

        post(
            &storage,
            day(1),
            &[(food, 300), (market, 200), (rent, 1000), (cash, -1500)],
        );

        let service = LedgerService::new(&storage);
        assert_eq!(service.get_spending_total(groceries.id).unwrap().cents(), 500);
        assert!(service
            .get_spending_total(EnvelopeId::new())
            .unwrap()
            .is_zero());
    }

    #[test]
    fn test_get_account_resolves_binding() {
        let (_temp_dir, storage) = create_test_storage();
        let groceries = Envelope::new("Groceries");
        storage.envelopes.insert(groceries.clone()).unwrap();
        let food = add_account(&storage, Account::bound("food", groceries.id));
        let orphan = add_account(&storage, Account::bound("orphan", EnvelopeId::new()));

        let service = LedgerService::new(&storage);

        let view = service.get_account(food).unwrap().unwrap();
        assert_eq!(view.envelope.unwrap().name, "Groceries");

        let view = service.get_account(orphan).unwrap().unwrap();
        assert!(view.binding_dangles());

        assert!(service.get_account(AccountId::new()).unwrap().is_none());
    }

    #[test]
    fn test_get_transaction_marks_dangling_entries() {
        let (_temp_dir, storage) = create_test_storage();
        let cash = add_account(&storage, Account::new("assets:cash"));
        let gone = add_account(&storage, Account::new("income:old"));
        let id = post(&storage, day(1), &[(cash, 100), (gone, -100)]);
        storage.accounts.delete(gone).unwrap();

        let service = LedgerService::new(&storage);
        let detail = service.get_transaction(id).unwrap().unwrap();

        assert_eq!(detail.entries.len(), 2);
        assert_eq!(detail.entries[0].account.account().unwrap().name, "assets:cash");
        assert_eq!(detail.entries[1].account.id(), gone);
        assert_eq!(detail.dangling_count(), 1);

        assert!(service.get_transaction(TransactionId::new()).unwrap().is_none());
    }

    #[test]
    fn test_transactions_with_account_are_stable_and_ascending() {
        let (_temp_dir, storage) = create_test_storage();
        let cash = add_account(&storage, Account::new("assets:cash"));
        let income = add_account(&storage, Account::new("income"));

        post(&storage, day(9), &[(cash, 1), (income, -1)]);
        post(&storage, day(3), &[(cash, 2), (income, -2)]);
        post(&storage, day(6), &[(cash, 3), (income, -3)]);

        let service = LedgerService::new(&storage);
        let first = service.get_transactions_with_account(cash).unwrap();
        let second = service.get_transactions_with_account(cash).unwrap();

        let dates: Vec<_> = first.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![day(3), day(6), day(9)]);
        let ids = |txns: &[Transaction]| txns.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_get_bound_accounts_and_envelope() {
        let (_temp_dir, storage) = create_test_storage();
        let rent = Envelope::new("Rent");
        storage.envelopes.insert(rent.clone()).unwrap();
        add_account(&storage, Account::bound("landlord", rent.id));

        let service = LedgerService::new(&storage);
        assert_eq!(service.get_bound_accounts(rent.id).unwrap().len(), 1);
        assert!(service.get_bound_accounts(EnvelopeId::new()).unwrap().is_empty());
        assert_eq!(service.get_envelope(rent.id).unwrap().unwrap().name, "Rent");
        assert!(service.get_envelope(EnvelopeId::new()).unwrap().is_none());
    }
}
