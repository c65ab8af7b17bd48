//! Envelope Ledger - a double-entry envelope budgeting ledger
//!
//! Accounts hold balances derived from balanced transactions, envelopes hold
//! budgeted money, and stashes move money between envelopes. Unallocated
//! funds are computed on demand from the full entry and stash history.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, envelopes, transactions, stashes)
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `services`: Ledger queries, stashing and availability
//! - `reports`: Registers, balance sheet, envelope summary
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `ledger` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use envelope_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use envelope_ledger::services::AvailableService;
//! use envelope_ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let available = AvailableService::new(&storage, &settings).get_available()?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Install the global tracing subscriber, writing to stderr.
///
/// Filtering follows `RUST_LOG` when set, otherwise `envelope_ledger=info`.
/// Safe to call more than once.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("envelope_ledger=info"));

        // Another subscriber may already be installed, e.g. by an embedding app
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_tracing_is_idempotent() {
        super::init_tracing();
        super::init_tracing();
    }
}
