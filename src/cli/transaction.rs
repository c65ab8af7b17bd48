//! Transaction CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Entry, Money};
use crate::services::{
    AccountService, CreateTransactionInput, LedgerService, TransactionFilter, TransactionService,
};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction; entries must sum to zero
    Add {
        /// Entries as ACCOUNT=AMOUNT, e.g. assets:cash=100 income=-100
        #[arg(required = true, num_args = 1..)]
        entries: Vec<String>,
        /// Free-text note
        #[arg(short, long, default_value = "")]
        note: String,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show a transaction and its entries
    Show {
        /// Transaction ID
        id: String,
    },
    /// List transactions, oldest first
    List {
        /// Only transactions touching this account
        #[arg(short, long)]
        account: Option<String>,
        /// Number of most recent transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service = TransactionService::new(storage);
    let accounts = AccountService::new(storage);

    match cmd {
        TransactionCommands::Add {
            entries,
            note,
            date,
        } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };

            let mut parsed = Vec::with_capacity(entries.len());
            for raw in &entries {
                let (account, amount) = parse_entry(raw, &settings.currency_symbol)?;
                parsed.push(Entry::new(accounts.require(account)?.id, amount));
            }

            let txn = service.create(CreateTransactionInput {
                date,
                note,
                entries: parsed,
            })?;

            println!("Recorded transaction: {}", txn);
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::Show { id } => {
            let txn = service
                .find(&id)?
                .ok_or_else(|| LedgerError::transaction_not_found(&id))?;

            let detail = LedgerService::new(storage)
                .get_transaction(txn.id)?
                .ok_or_else(|| LedgerError::transaction_not_found(&id))?;

            print!(
                "{}",
                format_transaction_details(
                    &detail,
                    &settings.date_format,
                    &settings.currency_symbol
                )
            );
        }

        TransactionCommands::List { account, limit } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(ident) = account {
                filter = filter.account(accounts.require(&ident)?.id);
            }

            let transactions = service.list(filter)?;
            print!(
                "{}",
                format_transaction_list(&transactions, &settings.date_format)
            );
        }
    }

    Ok(())
}

pub(crate) fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!("Invalid date: '{}'. Use YYYY-MM-DD format.", s))
    })
}

/// Split `ACCOUNT=AMOUNT` at the last '='
fn parse_entry<'r>(raw: &'r str, currency_symbol: &str) -> LedgerResult<(&'r str, Money)> {
    let (account, amount) = raw.rsplit_once('=').ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid entry: '{}'. Use ACCOUNT=AMOUNT, e.g. assets:cash=-12.50",
            raw
        ))
    })?;

    let account = account.trim();
    if account.is_empty() {
        return Err(LedgerError::Validation(format!(
            "Invalid entry: '{}'. Account is missing.",
            raw
        )));
    }

    let amount = Money::parse_with_symbol(amount, currency_symbol).map_err(|e| {
        LedgerError::Validation(format!("Invalid amount in entry '{}': {}", raw, e))
    })?;

    Ok((account, amount))
}
