//! CLI commands for reports
//!
//! Balances, available funds, account registers and the audit trail.

use clap::Args;

use crate::config::settings::{AvailableCalculation, Settings};
use crate::error::LedgerResult;
use crate::reports::{
    AccountRegisterReport, BalanceSheetReport, EnvelopeSummaryReport, RegisterFilter,
};
use crate::services::{AccountService, AvailableService};
use crate::storage::Storage;

use super::transaction::parse_date;

/// Arguments for the register report
#[derive(Args)]
pub struct RegisterArgs {
    /// Account name or ID
    pub account: String,
    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(short, long)]
    pub end: Option<String>,
}

/// Print every account's balance
pub fn handle_balances(storage: &Storage, settings: &Settings) -> LedgerResult<()> {
    let report = BalanceSheetReport::generate(storage)?;
    print!("{}", report.format_terminal(&settings.currency_symbol));
    Ok(())
}

/// Print available funds, optionally overriding the configured mode
pub fn handle_available(
    storage: &Storage,
    settings: &Settings,
    mode: Option<AvailableCalculation>,
    envelopes: bool,
) -> LedgerResult<()> {
    let mode = mode.unwrap_or(settings.available_calculation);

    if envelopes {
        let report = EnvelopeSummaryReport::generate(storage, settings)?;
        print!("{}", report.format_terminal(&settings.currency_symbol));
        println!();
    }

    let breakdown = AvailableService::new(storage, settings)
        .with_mode(mode)
        .breakdown()?;
    let money = |m: crate::models::Money| m.format_with_symbol(&settings.currency_symbol);

    println!("Inflow:       {:>14}", money(breakdown.inflow));
    println!("Net stashed:  {:>14}", money(breakdown.net_stashed));
    println!("Available:    {:>14}", money(breakdown.total()));

    Ok(())
}

/// Print the register for one account, newest first
pub fn handle_register(
    storage: &Storage,
    settings: &Settings,
    args: RegisterArgs,
) -> LedgerResult<()> {
    let account = AccountService::new(storage).require(&args.account)?;

    let filter = RegisterFilter {
        start_date: args.start.as_deref().map(parse_date).transpose()?,
        end_date: args.end.as_deref().map(parse_date).transpose()?,
    };

    let report = AccountRegisterReport::generate(storage, account.id, filter)?;
    print!("{}", report.format_terminal(&settings.currency_symbol));
    Ok(())
}

/// Print the most recent audit entries
pub fn handle_audit(storage: &Storage, limit: usize) -> LedgerResult<()> {
    let entries = storage.audit().read_recent(limit)?;
    if entries.is_empty() {
        println!("No audit entries.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
