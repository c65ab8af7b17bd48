//! Core data models for the ledger
//!
//! This module contains the data structures of the budgeting domain:
//! accounts, envelopes, transactions with their entries, and stash records.

pub mod account;
pub mod envelope;
pub mod ids;
pub mod money;
pub mod stash;
pub mod transaction;

pub use account::{Account, AccountValidationError};
pub use envelope::{Envelope, EnvelopeKind, EnvelopeValidationError};
pub use ids::{AccountId, EnvelopeId, StashId, TransactionId};
pub use money::Money;
pub use stash::Stash;
pub use transaction::{Entry, Transaction, TransactionValidationError};
