//! Envelope CLI commands
//!
//! Implements CLI commands for envelope management and stashing.

use std::collections::HashMap;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::envelope::{format_envelope_details, format_envelope_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::services::{EnvelopeService, LedgerService, StashRequest, StashService};
use crate::storage::{ExpectedVersions, Storage};

/// Envelope subcommands
#[derive(Subcommand)]
pub enum EnvelopeCommands {
    /// Create a new envelope
    Create {
        /// Envelope name
        name: String,
    },
    /// List all envelopes
    List,
    /// Show envelope details and stash history
    Show {
        /// Envelope name or ID
        envelope: String,
    },
    /// Delete an envelope
    Delete {
        /// Envelope name or ID
        envelope: String,
    },
}

/// Arguments for a stash
#[derive(clap::Args)]
pub struct StashArgs {
    /// Source envelope name or ID
    pub from: String,
    /// Destination envelope name or ID
    pub to: String,
    /// Amount to move (e.g., "25.00"); negative moves money back
    #[arg(allow_negative_numbers = true)]
    pub amount: String,
    /// Fail if the source envelope's version differs
    #[arg(long)]
    pub from_version: Option<u64>,
    /// Fail if the destination envelope's version differs
    #[arg(long)]
    pub to_version: Option<u64>,
}

/// Handle an envelope command
pub fn handle_envelope_command(
    storage: &Storage,
    settings: &Settings,
    cmd: EnvelopeCommands,
) -> LedgerResult<()> {
    let service = EnvelopeService::new(storage);

    match cmd {
        EnvelopeCommands::Create { name } => {
            let envelope = service.create(&name)?;
            println!("Created envelope: {}", envelope.name);
            println!("  ID: {}", envelope.id);
        }

        EnvelopeCommands::List => {
            let envelopes = service.list()?;
            print!(
                "{}",
                format_envelope_list(&envelopes, &settings.currency_symbol)
            );
        }

        EnvelopeCommands::Show { envelope } => {
            let found = service.require(&envelope)?;
            let ledger = LedgerService::new(storage);

            let spent = ledger.get_spending_total(found.id)?;
            let bound: Vec<String> = ledger
                .get_bound_accounts(found.id)?
                .into_iter()
                .map(|a| a.name)
                .collect();
            let stashes = service.get_stashes(Some(found.id))?;
            let names: HashMap<_, _> = service
                .list()?
                .into_iter()
                .map(|e| (e.id, e.name))
                .collect();

            print!(
                "{}",
                format_envelope_details(
                    &found,
                    spent,
                    &bound,
                    &stashes,
                    &names,
                    &settings.currency_symbol
                )
            );
        }

        EnvelopeCommands::Delete { envelope } => {
            let found = service.require(&envelope)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted envelope: {}", deleted.name);
        }
    }

    Ok(())
}

/// Handle a stash between two envelopes
pub fn handle_stash_command(
    storage: &Storage,
    settings: &Settings,
    args: StashArgs,
) -> LedgerResult<()> {
    let envelopes = EnvelopeService::new(storage);
    let from = envelopes.require(&args.from)?;
    let to = envelopes.require(&args.to)?;

    let amount = Money::parse_with_symbol(&args.amount, &settings.currency_symbol)
        .map_err(|e| LedgerError::Validation(format!("Invalid amount: {}", e)))?;

    let mut request = StashRequest::new(from.id, to.id, amount);
    request.expected = ExpectedVersions {
        from: args.from_version,
        to: args.to_version,
    };

    let outcome = StashService::new(storage).stash(request)?;
    let money = |m: Money| m.format_with_symbol(&settings.currency_symbol);

    println!(
        "Stashed {} from {} to {}",
        money(outcome.stash.amount),
        outcome.from.name,
        outcome.to.name
    );
    println!("  {}: {}", outcome.from.name, money(outcome.from.amount));
    println!("  {}: {}", outcome.to.name, money(outcome.to.amount));

    Ok(())
}
