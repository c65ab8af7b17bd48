//! Audit logging
//!
//! Every account, envelope and transaction change, and every stash, is
//! appended to a line-delimited JSON log (`audit.log`).
//!
//! - `AuditEntry`: one action on one [`Subject`], built from the domain value
//!   that changed. Stash entries name both envelopes.
//! - `AuditLogger`: appends entries to the log file and reads them back.
//!
//! Audit writes happen after the change itself is saved. Services go through
//! [`Storage::record`](crate::storage::Storage::record), which logs a failed
//! audit write as a warning instead of failing the saved change.
//!
//! # Example
//!
//! ```rust,ignore
//! use envelope_ledger::audit::{AuditEntry, AuditLogger};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::envelope_created(&envelope))?;
//! ```

mod entry;
mod logger;

pub use entry::{Action, AuditEntry, Subject};
pub use logger::AuditLogger;
