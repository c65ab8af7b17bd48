//! Audit entries
//!
//! One entry per ledger change, built from the domain value that changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::{
    Account, AccountId, Envelope, EnvelopeId, Money, Stash, StashId, Transaction, TransactionId,
};

/// What happened to the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    /// An account's envelope binding changed
    Rebound,
    Deleted,
    /// A transaction was posted
    Recorded,
    /// Money moved between two envelopes
    Stashed,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Action::Created => "CREATED",
            Action::Rebound => "REBOUND",
            Action::Deleted => "DELETED",
            Action::Recorded => "RECORDED",
            Action::Stashed => "STASHED",
        };
        f.write_str(label)
    }
}

/// The ledger object an entry is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Subject {
    Account {
        id: AccountId,
        name: String,
    },
    Envelope {
        id: EnvelopeId,
        name: String,
    },
    Transaction {
        id: TransactionId,
    },
    Stash {
        id: StashId,
        from: EnvelopeId,
        to: EnvelopeId,
    },
}

impl Subject {
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Account { .. } => "account",
            Subject::Envelope { .. } => "envelope",
            Subject::Transaction { .. } => "transaction",
            Subject::Stash { .. } => "stash",
        }
    }

    fn label(&self) -> String {
        match self {
            Subject::Account { id, name } => format!("{} ({})", id, name),
            Subject::Envelope { id, name } => format!("{} ({})", id, name),
            Subject::Transaction { id } => id.to_string(),
            Subject::Stash { id, .. } => id.to_string(),
        }
    }
}

/// A single line of the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    pub subject: Subject,

    /// Money moved, for stashes and transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,

    /// One-line description of the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Snapshot of the subject: after a create, before a delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<serde_json::Value>,
}

impl AuditEntry {
    fn new(action: Action, subject: Subject) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            subject,
            amount: None,
            detail: None,
            record: None,
        }
    }

    fn with_record<T: Serialize>(mut self, value: &T) -> Self {
        self.record = serde_json::to_value(value).ok();
        self
    }

    fn account_subject(account: &Account) -> Subject {
        Subject::Account {
            id: account.id,
            name: account.name.clone(),
        }
    }

    fn envelope_subject(envelope: &Envelope) -> Subject {
        Subject::Envelope {
            id: envelope.id,
            name: envelope.name.clone(),
        }
    }

    pub fn account_created(account: &Account) -> Self {
        Self::new(Action::Created, Self::account_subject(account)).with_record(account)
    }

    /// `detail` names the old and new envelope, e.g. `none -> Groceries`
    pub fn account_rebound(account: &Account, detail: String) -> Self {
        let mut entry = Self::new(Action::Rebound, Self::account_subject(account));
        entry.detail = Some(detail);
        entry
    }

    pub fn account_deleted(account: &Account) -> Self {
        Self::new(Action::Deleted, Self::account_subject(account)).with_record(account)
    }

    pub fn envelope_created(envelope: &Envelope) -> Self {
        Self::new(Action::Created, Self::envelope_subject(envelope)).with_record(envelope)
    }

    pub fn envelope_deleted(envelope: &Envelope) -> Self {
        Self::new(Action::Deleted, Self::envelope_subject(envelope)).with_record(envelope)
    }

    /// A posted transaction; `amount` is the sum of its positive entries
    pub fn transaction_recorded(txn: &Transaction) -> Self {
        let mut entry =
            Self::new(Action::Recorded, Subject::Transaction { id: txn.id }).with_record(txn);
        entry.amount = Some(
            txn.entries
                .iter()
                .map(|e| e.amount.positive_part())
                .sum(),
        );
        let date = txn.date.format("%Y-%m-%d");
        entry.detail = Some(if txn.note.is_empty() {
            date.to_string()
        } else {
            format!("{} {}", date, txn.note)
        });
        entry
    }

    /// A committed stash, with both envelopes as they stood afterwards
    pub fn stash_committed(stash: &Stash, from: &Envelope, to: &Envelope) -> Self {
        let mut entry = Self::new(
            Action::Stashed,
            Subject::Stash {
                id: stash.id,
                from: stash.from,
                to: stash.to,
            },
        );
        entry.amount = Some(stash.amount);
        entry.detail = Some(format!("{} -> {}", from.name, to.name));
        entry.record = Some(json!({
            "from": { "amount": from.amount, "version": from.version },
            "to": { "amount": to.amount, "version": to.version },
        }));
        entry
    }

    /// `[timestamp] ACTION kind id (name) detail amount`
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.subject.kind(),
            self.subject.label()
        );

        if let Some(detail) = &self.detail {
            output.push_str(&format!("  {}", detail));
        }
        if let Some(amount) = self.amount {
            output.push_str(&format!("  {}", amount));
        }

        output
    }
}
