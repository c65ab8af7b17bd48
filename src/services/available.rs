//! Available funds calculation
//!
//! Available = asset inflow + net stash activity on the Available envelope,
//! recomputed from the full entry and stash history on every call.

use std::collections::HashMap;

use crate::config::settings::{AvailableCalculation, Settings};
use crate::error::LedgerResult;
use crate::models::{Account, AccountId, EnvelopeId, EnvelopeKind, Money, Transaction};
use crate::storage::Storage;

/// The parts that make up the available figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailableBreakdown {
    pub mode: AvailableCalculation,
    /// Money that entered asset accounts
    pub inflow: Money,
    /// Stashed into Available minus stashed out of it
    pub net_stashed: Money,
}

impl AvailableBreakdown {
    pub fn total(&self) -> Money {
        self.inflow + self.net_stashed
    }
}

/// Computes unallocated funds
pub struct AvailableService<'a> {
    storage: &'a Storage,
    asset_prefix: &'a str,
    mode: AvailableCalculation,
}

impl<'a> AvailableService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self {
            storage,
            asset_prefix: &settings.asset_prefix,
            mode: settings.available_calculation,
        }
    }

    /// Override the configured calculation mode
    pub fn with_mode(mut self, mode: AvailableCalculation) -> Self {
        self.mode = mode;
        self
    }

    pub fn get_available(&self) -> LedgerResult<Money> {
        Ok(self.breakdown()?.total())
    }

    pub fn breakdown(&self) -> LedgerResult<AvailableBreakdown> {
        let accounts = self.storage.accounts.get_map()?;
        let transactions = self.storage.transactions.get_all()?;

        let inflow: Money = match self.mode {
            AvailableCalculation::Parity => transactions
                .iter()
                .map(|t| self.asset_inflow(t, &accounts))
                .sum(),
            AvailableCalculation::ExcludeAllocated => {
                let kinds = self.envelope_kinds()?;
                transactions
                    .iter()
                    .map(|t| {
                        let allocated = allocated_outflow(t, &accounts, &kinds);
                        (self.asset_inflow(t, &accounts) - allocated).positive_part()
                    })
                    .sum()
            }
        };

        let net_stashed = match self.storage.envelopes.get_available()? {
            Some(available) => self.storage.envelopes.net_stashed(available.id)?,
            None => {
                tracing::warn!("no Available envelope, counting no stash activity");
                Money::zero()
            }
        };

        tracing::debug!(mode = ?self.mode, %inflow, %net_stashed, "computed available");

        Ok(AvailableBreakdown {
            mode: self.mode,
            inflow,
            net_stashed,
        })
    }

    /// Positive entries on accounts whose name starts with the asset prefix
    fn asset_inflow(&self, txn: &Transaction, accounts: &HashMap<AccountId, Account>) -> Money {
        txn.entries
            .iter()
            .filter(|e| {
                accounts
                    .get(&e.account_id)
                    .is_some_and(|a| a.has_prefix(self.asset_prefix))
            })
            .map(|e| e.amount.positive_part())
            .sum()
    }

    fn envelope_kinds(&self) -> LedgerResult<HashMap<EnvelopeId, EnvelopeKind>> {
        Ok(self
            .storage
            .envelopes
            .get_all()?
            .into_iter()
            .map(|e| (e.id, e.kind))
            .collect())
    }
}

/// Money leaving accounts bound to ordinary envelopes within one transaction
fn allocated_outflow(
    txn: &Transaction,
    accounts: &HashMap<AccountId, Account>,
    kinds: &HashMap<EnvelopeId, EnvelopeKind>,
) -> Money {
    txn.entries
        .iter()
        .filter(|e| e.amount.is_negative())
        .filter(|e| {
            accounts
                .get(&e.account_id)
                .and_then(|a| a.bound_to)
                .and_then(|id| kinds.get(&id))
                .is_some_and(|kind| *kind == EnvelopeKind::Ordinary)
        })
        .map(|e| e.amount.abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Entry, Envelope};
    use crate::services::{StashRequest, StashService};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        available: Envelope,
        groceries: Envelope,
        cash: AccountId,
        food: AccountId,
        income: AccountId,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let available = Envelope::available("Available");
        let groceries = Envelope::new("Groceries");
        storage.envelopes.insert(available.clone()).unwrap();
        storage.envelopes.insert(groceries.clone()).unwrap();

        let cash = Account::new("assets:cash");
        let food = Account::bound("food", groceries.id);
        let income = Account::new("income:salary");
        let ids = (cash.id, food.id, income.id);
        for account in [cash, food, income] {
            storage.accounts.upsert(account).unwrap();
        }

        Fixture {
            _temp_dir: temp_dir,
            storage,
            available,
            groceries,
            cash: ids.0,
            food: ids.1,
            income: ids.2,
        }
    }

    fn post(storage: &Storage, entries: &[(AccountId, i64)]) {
        let txn = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            "",
            entries
                .iter()
                .map(|(id, cents)| Entry::new(*id, Money::from_cents(*cents)))
                .collect(),
        );
        storage.transactions.append(txn).unwrap();
    }

    #[test]
    fn test_scenario_parity() {
        let f = fixture();
        post(&f.storage, &[(f.cash, 10000), (f.food, -10000)]);

        let settings = Settings::default();
        let service = AvailableService::new(&f.storage, &settings);
        assert_eq!(service.get_available().unwrap().cents(), 10000);
    }

    #[test]
    fn test_only_positive_asset_entries_count() {
        let f = fixture();
        post(&f.storage, &[(f.cash, 8000), (f.income, -8000)]);
        post(&f.storage, &[(f.cash, -3000), (f.food, 3000)]);

        let settings = Settings::default();
        let breakdown = AvailableService::new(&f.storage, &settings)
            .breakdown()
            .unwrap();
        assert_eq!(breakdown.inflow.cents(), 8000);
        assert!(breakdown.net_stashed.is_zero());
    }

    #[test]
    fn test_prefix_match_is_literal() {
        let f = fixture();
        let odd = Account::new("assetsfoo");
        let odd_id = odd.id;
        f.storage.accounts.upsert(odd).unwrap();
        post(&f.storage, &[(odd_id, 100), (f.income, -100)]);

        let settings = Settings::default();
        let service = AvailableService::new(&f.storage, &settings);
        assert_eq!(service.get_available().unwrap().cents(), 100);
    }

    #[test]
    fn test_stashes_touching_available() {
        let f = fixture();
        post(&f.storage, &[(f.cash, 10000), (f.income, -10000)]);

        let stashes = StashService::new(&f.storage);
        stashes
            .stash(StashRequest::new(
                f.available.id,
                f.groceries.id,
                Money::from_cents(2500),
            ))
            .unwrap();
        stashes
            .stash(StashRequest::new(
                f.groceries.id,
                f.available.id,
                Money::from_cents(500),
            ))
            .unwrap();

        let settings = Settings::default();
        let breakdown = AvailableService::new(&f.storage, &settings)
            .breakdown()
            .unwrap();
        assert_eq!(breakdown.net_stashed.cents(), -2000);
        assert_eq!(breakdown.total().cents(), 8000);
    }

    #[test]
    fn test_exclude_allocated_skips_envelope_bound_inflow() {
        let f = fixture();
        // Deposit routed straight to Groceries
        post(&f.storage, &[(f.cash, 10000), (f.food, -10000)]);
        // Plain income
        post(&f.storage, &[(f.cash, 4000), (f.income, -4000)]);
        // Partly allocated deposit
        post(
            &f.storage,
            &[(f.cash, 1000), (f.food, -300), (f.income, -700)],
        );

        let settings = Settings::default();
        let service = AvailableService::new(&f.storage, &settings);
        assert_eq!(service.get_available().unwrap().cents(), 15000);

        let service = service.with_mode(AvailableCalculation::ExcludeAllocated);
        assert_eq!(service.get_available().unwrap().cents(), 4700);
    }

    #[test]
    fn test_exclude_allocated_never_goes_negative_per_transaction() {
        let f = fixture();
        post(&f.storage, &[(f.income, 500), (f.food, -500)]);

        let mut settings = Settings::default();
        settings.available_calculation = AvailableCalculation::ExcludeAllocated;
        let service = AvailableService::new(&f.storage, &settings);
        assert!(service.get_available().unwrap().is_zero());
    }

    #[test]
    fn test_custom_asset_prefix() {
        let f = fixture();
        let bank = Account::new("bank:checking");
        let bank_id = bank.id;
        f.storage.accounts.upsert(bank).unwrap();
        post(&f.storage, &[(bank_id, 900), (f.income, -900)]);
        post(&f.storage, &[(f.cash, 100), (f.income, -100)]);

        let mut settings = Settings::default();
        settings.asset_prefix = "bank".into();
        let service = AvailableService::new(&f.storage, &settings);
        assert_eq!(service.get_available().unwrap().cents(), 900);
    }
}
