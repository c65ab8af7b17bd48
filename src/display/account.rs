//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use std::collections::HashMap;

use crate::models::{AccountId, Money};
use crate::services::AccountView;

fn binding_label(view: &AccountView) -> String {
    match (&view.envelope, view.account.bound_to) {
        (Some(envelope), _) => envelope.name.clone(),
        (None, Some(id)) => format!("{} (missing)", id),
        (None, None) => String::new(),
    }
}

/// Format a list of accounts with balances as a table.
///
/// Accounts missing from `balances` have no entries and show zero.
pub fn format_account_list(
    views: &[AccountView],
    balances: &HashMap<AccountId, Money>,
    currency_symbol: &str,
) -> String {
    if views.is_empty() {
        return "No accounts found.".to_string();
    }

    let name_width = views
        .iter()
        .map(|v| v.account.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let labels: Vec<String> = views.iter().map(binding_label).collect();
    let env_width = labels.iter().map(String::len).max().unwrap_or(8).max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<env_width$}  {:>14}\n",
        "Name", "Envelope", "Balance",
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<env_width$}  {:->14}\n",
        "", "", "",
    ));

    for (view, label) in views.iter().zip(&labels) {
        let balance = balances.get(&view.account.id).copied().unwrap_or_default();
        output.push_str(&format!(
            "{:<name_width$}  {:<env_width$}  {:>14}\n",
            view.account.name,
            label,
            balance.format_with_symbol(currency_symbol),
        ));
    }

    output
}

/// Format a single account's details
pub fn format_account_details(
    view: &AccountView,
    balance: Money,
    transaction_count: usize,
    currency_symbol: &str,
) -> String {
    let account = &view.account;
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  ID:           {}\n", account.id));
    let label = binding_label(view);
    output.push_str(&format!(
        "  Envelope:     {}\n",
        if label.is_empty() { "(none)" } else { &label }
    ));
    output.push('\n');
    output.push_str(&format!(
        "  Balance:      {}\n",
        balance.format_with_symbol(currency_symbol)
    ));
    output.push_str(&format!("  Transactions: {}\n", transaction_count));
    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        account.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        account.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}
