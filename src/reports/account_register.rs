//! Account Register Report
//!
//! A per-account register: transactions touching the account, oldest first,
//! each with the account's running balance after it. Balances are always
//! accumulated oldest first; `display_order` only flips the presentation.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountId, Money, Transaction, TransactionId};
use crate::services::LedgerService;
use crate::storage::Storage;

/// A single row in the register
#[derive(Debug, Clone)]
pub struct RegisterEntry {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    pub note: String,
    /// Net amount the transaction posts to this account
    pub amount: Money,
    /// Balance after this transaction
    pub running_balance: Money,
    /// The other accounts in the transaction
    pub counterparts: Vec<String>,
}

/// Date window for the register
#[derive(Debug, Clone, Default)]
pub struct RegisterFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RegisterFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(start) = self.start_date {
            if txn.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if txn.date > end {
                return false;
            }
        }
        true
    }
}

/// Account Register Report
#[derive(Debug, Clone)]
pub struct AccountRegisterReport {
    pub account_id: AccountId,
    pub account_name: String,
    /// Balance carried in from transactions before the filter window
    pub starting_balance: Money,
    pub ending_balance: Money,
    /// Rows oldest first
    pub entries: Vec<RegisterEntry>,
    pub total_inflows: Money,
    pub total_outflows: Money,
    pub filter: RegisterFilter,
}

impl AccountRegisterReport {
    /// Generate a register report for an account
    pub fn generate(
        storage: &Storage,
        account_id: AccountId,
        filter: RegisterFilter,
    ) -> LedgerResult<Self> {
        let ledger = LedgerService::new(storage);

        let account = ledger
            .get_account(account_id)?
            .ok_or_else(|| LedgerError::account_not_found(account_id.to_string()))?
            .account;

        let transactions = ledger.get_transactions_with_account(account_id)?;
        let names = storage.accounts.get_map()?;

        let mut starting_balance = Money::zero();
        let mut running_balance = Money::zero();
        let mut total_inflows = Money::zero();
        let mut total_outflows = Money::zero();
        let mut entries = Vec::new();

        for txn in &transactions {
            let amount = txn.amount_for(account_id);

            if filter.start_date.is_some_and(|start| txn.date < start) {
                starting_balance += amount;
                running_balance += amount;
                continue;
            }
            if !filter.matches(txn) {
                continue;
            }

            running_balance += amount;
            if amount.is_positive() {
                total_inflows += amount;
            } else {
                total_outflows += amount;
            }

            entries.push(RegisterEntry {
                transaction_id: txn.id,
                date: txn.date,
                note: txn.note.clone(),
                amount,
                running_balance,
                counterparts: counterparts(txn, account_id, &names),
            });
        }

        Ok(Self {
            account_id,
            account_name: account.name,
            starting_balance,
            ending_balance: running_balance,
            entries,
            total_inflows,
            total_outflows,
            filter,
        })
    }

    /// Rows newest first, balances unchanged
    pub fn display_order(&self) -> impl Iterator<Item = &RegisterEntry> {
        self.entries.iter().rev()
    }

    /// Format the report for terminal display, newest first
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(currency_symbol);
        let mut output = String::new();

        output.push_str(&format!("Account Register: {}\n", self.account_name));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        if let Some(start) = self.filter.start_date {
            output.push_str(&format!("From: {} ", start));
        }
        if let Some(end) = self.filter.end_date {
            output.push_str(&format!("To: {} ", end));
        }
        if self.filter.start_date.is_some() || self.filter.end_date.is_some() {
            output.push('\n');
        }

        output.push_str(&format!("Starting Balance: {}\n", money(self.starting_balance)));
        output.push_str(&format!("Ending Balance:   {}\n\n", money(self.ending_balance)));

        output.push_str(&format!(
            "{:<12} {:<24} {:<20} {:>12} {:>12}\n",
            "Date", "Note", "Against", "Amount", "Balance"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for entry in self.display_order() {
            output.push_str(&format!(
                "{:<12} {:<24} {:<20} {:>12} {:>12}\n",
                entry.date,
                truncate(&entry.note, 24),
                truncate(&entry.counterparts.join(", "), 20),
                money(entry.amount),
                money(entry.running_balance),
            ));
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "Total Inflows:  {}  |  Total Outflows: {}  |  Transactions: {}\n",
            money(self.total_inflows),
            money(self.total_outflows.abs()),
            self.entries.len()
        ));

        output
    }
}

fn counterparts(
    txn: &Transaction,
    account_id: AccountId,
    names: &HashMap<AccountId, Account>,
) -> Vec<String> {
    txn.account_ids()
        .into_iter()
        .filter(|id| *id != account_id)
        .map(|id| {
            names
                .get(&id)
                .map_or_else(|| format!("{} (deleted)", id), |a| a.name.clone())
        })
        .collect()
}

pub(crate) fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Entry;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn setup() -> (TempDir, Storage, AccountId, AccountId) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let cash = Account::new("assets:cash");
        let income = Account::new("income");
        let ids = (cash.id, income.id);
        storage.accounts.upsert(cash).unwrap();
        storage.accounts.upsert(income).unwrap();

        // Written out of date order on purpose
        for (d, cents) in [(10, -300), (2, 1000), (5, 250)] {
            storage
                .transactions
                .append(Transaction::new(
                    day(d),
                    format!("day {}", d),
                    vec![
                        Entry::new(ids.0, Money::from_cents(cents)),
                        Entry::new(ids.1, Money::from_cents(-cents)),
                    ],
                ))
                .unwrap();
        }

        (temp_dir, storage, ids.0, ids.1)
    }

    #[test]
    fn test_running_balance_accumulates_oldest_first() {
        let (_temp_dir, storage, cash, _) = setup();

        let report =
            AccountRegisterReport::generate(&storage, cash, RegisterFilter::default()).unwrap();

        let balances: Vec<_> = report
            .entries
            .iter()
            .map(|e| e.running_balance.cents())
            .collect();
        assert_eq!(balances, vec![1000, 1250, 950]);
        assert_eq!(report.ending_balance.cents(), 950);
        assert_eq!(report.total_inflows.cents(), 1250);
        assert_eq!(report.total_outflows.cents(), -300);
    }

    #[test]
    fn test_display_order_reverses_without_recomputing() {
        let (_temp_dir, storage, cash, _) = setup();
        let report =
            AccountRegisterReport::generate(&storage, cash, RegisterFilter::default()).unwrap();

        let shown: Vec<_> = report
            .display_order()
            .map(|e| (e.date, e.running_balance.cents()))
            .collect();
        assert_eq!(
            shown,
            vec![(day(10), 950), (day(5), 1250), (day(2), 1000)]
        );

        // Walking the display rows back up reproduces the ascending register
        let mut balance = report.starting_balance;
        let mut rebuilt: Vec<_> = report.display_order().collect();
        rebuilt.reverse();
        for entry in rebuilt {
            balance += entry.amount;
            assert_eq!(balance, entry.running_balance);
        }
    }

    #[test]
    fn test_filter_carries_starting_balance() {
        let (_temp_dir, storage, cash, _) = setup();
        let filter = RegisterFilter {
            start_date: Some(day(3)),
            end_date: Some(day(7)),
        };

        let report = AccountRegisterReport::generate(&storage, cash, filter).unwrap();
        assert_eq!(report.starting_balance.cents(), 1000);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].running_balance.cents(), 1250);
    }

    #[test]
    fn test_counterparts_and_deleted_accounts() {
        let (_temp_dir, storage, cash, income) = setup();
        storage.accounts.delete(income).unwrap();

        let report =
            AccountRegisterReport::generate(&storage, cash, RegisterFilter::default()).unwrap();
        assert!(report.entries[0].counterparts[0].ends_with("(deleted)"));

        let text = report.format_terminal("$");
        assert!(text.contains("Account Register: assets:cash"));
        assert!(text.contains("$9.50"));
    }

    #[test]
    fn test_unknown_account() {
        let (_temp_dir, storage, _, _) = setup();
        let err = AccountRegisterReport::generate(&storage, AccountId::new(), RegisterFilter::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer note", 10), "a much ...");
    }
}
