//! Transaction display formatting
//!
//! Register-style lists and per-transaction detail views.

use crate::models::Transaction;
use crate::reports::account_register::truncate;
use crate::services::{EntryAccount, TransactionDetail};

/// Format a single transaction as a list row
pub fn format_transaction_row(txn: &Transaction, date_format: &str) -> String {
    let note = if txn.note.is_empty() {
        "(no note)".to_string()
    } else {
        txn.note.clone()
    };

    format!(
        "{:<10} {:<12} {:<30} {:>3}",
        txn.id,
        txn.date.format(date_format),
        truncate(&note, 30),
        txn.entries.len()
    )
}

/// Format a list of transactions, oldest first
pub fn format_transaction_list(transactions: &[Transaction], date_format: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10} {:<12} {:<30} {:>3}\n",
        "ID", "Date", "Note", "#"
    ));
    output.push_str(&"-".repeat(58));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, date_format));
        output.push('\n');
    }

    output
}

/// Format transaction details with each entry's account
pub fn format_transaction_details(
    detail: &TransactionDetail,
    date_format: &str,
    currency_symbol: &str,
) -> String {
    let txn = &detail.transaction;
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format(date_format)));
    if !txn.note.is_empty() {
        output.push_str(&format!("Note:        {}\n", txn.note));
    }

    output.push_str("\nEntries:\n");
    for (i, entry) in detail.entries.iter().enumerate() {
        let account = match &entry.account {
            EntryAccount::Resolved(account) => account.name.clone(),
            EntryAccount::Dangling(id) => format!("{} (deleted)", id),
        };
        output.push_str(&format!(
            "  {}. {:<30} {:>14}\n",
            i + 1,
            account,
            entry.amount.format_with_symbol(currency_symbol)
        ));
    }

    output
}
