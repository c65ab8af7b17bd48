//! Service layer for the ledger
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, audit logging, and the balance and availability queries.

pub mod account;
pub mod available;
pub mod envelope;
pub mod ledger;
pub mod stash;
pub mod transaction;

pub use account::AccountService;
pub use available::{AvailableBreakdown, AvailableService};
pub use envelope::EnvelopeService;
pub use ledger::{AccountView, EntryAccount, EntryDetail, LedgerService, TransactionDetail};
pub use stash::{StashRequest, StashService};
pub use transaction::{CreateTransactionInput, TransactionFilter, TransactionService};
