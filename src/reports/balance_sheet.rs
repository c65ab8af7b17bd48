//! Balance Sheet Report
//!
//! Every account with its balance, grouped by the top-level segment of its
//! name. Accounts with no entries show a zero balance. Entries on deleted
//! accounts are totalled separately so the sheet still sums to zero.

use std::collections::BTreeMap;

use crate::error::LedgerResult;
use crate::models::{AccountId, Money};
use crate::services::LedgerService;
use crate::storage::Storage;

/// One account's line on the sheet
#[derive(Debug, Clone)]
pub struct AccountBalance {
    pub account_id: AccountId,
    pub account_name: String,
    /// Name of the bound envelope, if the binding resolves
    pub envelope_name: Option<String>,
    pub balance: Money,
}

/// Accounts sharing a top-level name segment
#[derive(Debug, Clone)]
pub struct BalanceGroup {
    pub root: String,
    pub accounts: Vec<AccountBalance>,
    pub total: Money,
}

/// Balance Sheet Report
#[derive(Debug, Clone)]
pub struct BalanceSheetReport {
    /// Groups ordered by root name
    pub groups: Vec<BalanceGroup>,
    /// Sum of entries whose account no longer exists
    pub dangling_total: Money,
}

impl BalanceSheetReport {
    pub fn generate(storage: &Storage) -> LedgerResult<Self> {
        let ledger = LedgerService::new(storage);
        let balances = ledger.get_account_balances()?;
        let envelope_names: std::collections::HashMap<_, _> = storage
            .envelopes
            .get_all()?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();

        let mut groups: BTreeMap<String, BalanceGroup> = BTreeMap::new();
        for account in storage.accounts.get_all()? {
            let balance = balances.get(&account.id).copied().unwrap_or_default();
            let root = account.root().to_string();

            let group = groups.entry(root.clone()).or_insert_with(|| BalanceGroup {
                root,
                accounts: Vec::new(),
                total: Money::zero(),
            });
            group.total += balance;
            group.accounts.push(AccountBalance {
                account_id: account.id,
                envelope_name: account
                    .bound_to
                    .and_then(|id| envelope_names.get(&id).cloned()),
                account_name: account.name,
                balance,
            });
        }

        Ok(Self {
            groups: groups.into_values().collect(),
            dangling_total: ledger.get_dangling_total()?,
        })
    }

    /// Look up one account's line
    pub fn balance_of(&self, account_id: AccountId) -> Option<Money> {
        self.groups
            .iter()
            .flat_map(|g| g.accounts.iter())
            .find(|a| a.account_id == account_id)
            .map(|a| a.balance)
    }

    /// Sum of every line plus the dangling total; zero for a balanced ledger
    pub fn grand_total(&self) -> Money {
        self.groups.iter().map(|g| g.total).sum::<Money>() + self.dangling_total
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(currency_symbol);
        let mut output = String::new();

        output.push_str("Balances\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<30} {:<14} {:>14}\n",
            "Account", "Envelope", "Balance"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for group in &self.groups {
            for line in &group.accounts {
                output.push_str(&format!(
                    "{:<30} {:<14} {:>14}\n",
                    line.account_name,
                    line.envelope_name.as_deref().unwrap_or(""),
                    money(line.balance)
                ));
            }
            output.push_str(&format!(
                "{:<30} {:<14} {:>14}\n\n",
                format!("  total {}", group.root),
                "",
                money(group.total)
            ));
        }

        if !self.dangling_total.is_zero() {
            output.push_str(&format!(
                "{:<45} {:>14}\n",
                "Entries on deleted accounts",
                money(self.dangling_total)
            ));
        }

        output
    }
}
