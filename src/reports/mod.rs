//! Reports module
//!
//! Account registers, the balance sheet and the envelope summary, each with
//! a plain-text terminal rendering.

pub mod account_register;
pub mod balance_sheet;
pub mod envelope_summary;

pub use account_register::{AccountRegisterReport, RegisterEntry, RegisterFilter};
pub use balance_sheet::{AccountBalance, BalanceGroup, BalanceSheetReport};
pub use envelope_summary::{EnvelopeRow, EnvelopeSummaryReport};
