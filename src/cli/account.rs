//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::account::{format_account_details, format_account_list};
use crate::error::{LedgerError, LedgerResult};
use crate::services::{AccountService, EnvelopeService, LedgerService};
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name, e.g. "assets:checking"
        name: String,
        /// Envelope that governs spending from this account
        #[arg(short, long)]
        envelope: Option<String>,
    },
    /// List all accounts with balances
    List,
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Bind an account to an envelope, or unbind it
    Bind {
        /// Account name or ID
        account: String,
        /// Envelope name or ID
        #[arg(required_unless_present = "none")]
        envelope: Option<String>,
        /// Remove the current binding
        #[arg(long, conflicts_with = "envelope")]
        none: bool,
    },
    /// Delete an account. Its transactions are kept.
    Delete {
        /// Account name or ID
        account: String,
    },
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let service = AccountService::new(storage);
    let ledger = LedgerService::new(storage);
    let envelopes = EnvelopeService::new(storage);

    match cmd {
        AccountCommands::Create { name, envelope } => {
            let bound_to = match envelope {
                Some(ident) => Some(envelopes.require(&ident)?.id),
                None => None,
            };

            let account = service.create(&name, bound_to)?;

            println!("Created account: {}", account.name);
            if let Some(view) = ledger.get_account(account.id)? {
                if let Some(envelope) = view.envelope {
                    println!("  Envelope: {}", envelope.name);
                }
            }
            println!("  ID: {}", account.id);
        }

        AccountCommands::List => {
            let mut views = Vec::new();
            for account in service.list()? {
                if let Some(view) = ledger.get_account(account.id)? {
                    views.push(view);
                }
            }
            let balances = ledger.get_account_balances()?;
            print!(
                "{}",
                format_account_list(&views, &balances, &settings.currency_symbol)
            );
        }

        AccountCommands::Show { account } => {
            let found = service.require(&account)?;
            let view = ledger
                .get_account(found.id)?
                .ok_or_else(|| LedgerError::account_not_found(&account))?;

            let balances = ledger.get_account_balances()?;
            let balance = balances.get(&found.id).copied().unwrap_or_default();
            let count = storage.transactions.count_for_account(found.id)?;

            print!(
                "{}",
                format_account_details(&view, balance, count, &settings.currency_symbol)
            );
        }

        AccountCommands::Bind {
            account,
            envelope,
            none: _,
        } => {
            let found = service.require(&account)?;
            let target = match envelope {
                Some(ident) => Some(envelopes.require(&ident)?),
                None => None,
            };

            let updated = service.bind(found.id, target.as_ref().map(|e| e.id))?;
            match target {
                Some(envelope) => println!("Bound {} to {}", updated.name, envelope.name),
                None => println!("Unbound {}", updated.name),
            }
        }

        AccountCommands::Delete { account } => {
            let found = service.require(&account)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted account: {}", deleted.name);
        }
    }

    Ok(())
}
