//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod envelope;
pub mod report;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use envelope::{handle_envelope_command, handle_stash_command, EnvelopeCommands, StashArgs};
pub use report::{handle_audit, handle_available, handle_balances, handle_register, RegisterArgs};
pub use transaction::{handle_transaction_command, TransactionCommands};
