//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for accounts, envelopes and
//! transactions. Amounts use the configured currency symbol.

pub mod account;
pub mod envelope;
pub mod transaction;

pub use account::{format_account_details, format_account_list};
pub use envelope::{format_envelope_details, format_envelope_list};
pub use transaction::{format_transaction_details, format_transaction_list};
