//! Envelope Summary Report
//!
//! Each envelope's allocated amount next to what its bound accounts have
//! spent, plus the current available figure.

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::models::{EnvelopeId, EnvelopeKind, Money};
use crate::services::{AvailableBreakdown, AvailableService, LedgerService};
use crate::storage::Storage;

/// One envelope's row
#[derive(Debug, Clone)]
pub struct EnvelopeRow {
    pub envelope_id: EnvelopeId,
    pub name: String,
    pub kind: EnvelopeKind,
    pub amount: Money,
    pub spent: Money,
    pub bound_accounts: usize,
}

/// Envelope Summary Report
#[derive(Debug, Clone)]
pub struct EnvelopeSummaryReport {
    /// Available first, then by name
    pub rows: Vec<EnvelopeRow>,
    pub available: AvailableBreakdown,
}

impl EnvelopeSummaryReport {
    pub fn generate(storage: &Storage, settings: &Settings) -> LedgerResult<Self> {
        let ledger = LedgerService::new(storage);

        let mut rows = Vec::new();
        for envelope in storage.envelopes.get_all()? {
            rows.push(EnvelopeRow {
                spent: ledger.get_spending_total(envelope.id)?,
                bound_accounts: ledger.get_bound_accounts(envelope.id)?.len(),
                envelope_id: envelope.id,
                name: envelope.name,
                kind: envelope.kind,
                amount: envelope.amount,
            });
        }

        Ok(Self {
            rows,
            available: AvailableService::new(storage, settings).breakdown()?,
        })
    }

    /// Total allocated across ordinary envelopes
    pub fn total_allocated(&self) -> Money {
        self.rows
            .iter()
            .filter(|r| r.kind == EnvelopeKind::Ordinary)
            .map(|r| r.amount)
            .sum()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(currency_symbol);
        let mut output = String::new();

        output.push_str(&format!(
            "{:<24} {:>14} {:>14} {:>8}\n",
            "Envelope", "Amount", "Spent", "Accounts"
        ));
        output.push_str(&"-".repeat(63));
        output.push('\n');

        for row in &self.rows {
            let name = match row.kind {
                EnvelopeKind::Available => format!("{} *", row.name),
                EnvelopeKind::Ordinary => row.name.clone(),
            };
            output.push_str(&format!(
                "{:<24} {:>14} {:>14} {:>8}\n",
                name,
                money(row.amount),
                money(row.spent),
                row.bound_accounts
            ));
        }

        output.push_str(&"-".repeat(63));
        output.push('\n');
        output.push_str(&format!(
            "Allocated: {}  |  Available: {}\n",
            money(self.total_allocated()),
            money(self.available.total())
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Account, Entry, Envelope, Transaction};
    use crate::services::{StashRequest, StashService};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_summary_rows() {
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
        let income = Account::new("income");
        let ids = (cash.id, food.id, income.id);
        for account in [cash, food, income] {
            storage.accounts.upsert(account).unwrap();
        }

        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        for entries in [
            vec![(ids.0, 5000), (ids.2, -5000)],
            vec![(ids.1, 1200), (ids.0, -1200)],
        ] {
            storage
                .transactions
                .append(Transaction::new(
                    date,
                    "",
                    entries
                        .into_iter()
                        .map(|(id, c)| Entry::new(id, Money::from_cents(c)))
                        .collect(),
                ))
                .unwrap();
        }
        StashService::new(&storage)
            .stash(StashRequest::new(
                available.id,
                groceries.id,
                Money::from_cents(2000),
            ))
            .unwrap();

        let report = EnvelopeSummaryReport::generate(&storage, &Settings::default()).unwrap();

        assert_eq!(report.rows[0].kind, EnvelopeKind::Available);
        let row = &report.rows[1];
        assert_eq!(row.name, "Groceries");
        assert_eq!(row.amount.cents(), 2000);
        assert_eq!(row.spent.cents(), 1200);
        assert_eq!(row.bound_accounts, 1);
        assert_eq!(report.total_allocated().cents(), 2000);
        assert_eq!(report.available.total().cents(), 3000);

        assert!(report.format_terminal("$").contains("Available *"));
    }
}
