//! Stash model
//!
//! A stash is the audit record of moving budgeted money from one envelope to
//! another. Stash records are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{EnvelopeId, StashId};
use super::money::Money;

/// A recorded transfer between two envelopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stash {
    /// Unique identifier
    pub id: StashId,

    /// Envelope the money left
    pub from: EnvelopeId,

    /// Envelope the money went to
    pub to: EnvelopeId,

    /// Signed amount; negative moves money from `to` back into `from`
    pub amount: Money,

    /// When the stash was committed
    pub created_at: DateTime<Utc>,
}

impl Stash {
    pub fn new(from: EnvelopeId, to: EnvelopeId, amount: Money) -> Self {
        Self {
            id: StashId::new(),
            from,
            to,
            amount,
            created_at: Utc::now(),
        }
    }

    /// Whether this stash moves money in or out of the envelope
    pub fn touches(&self, envelope_id: EnvelopeId) -> bool {
        self.from == envelope_id || self.to == envelope_id
    }

    /// Effect of this stash on one envelope's balance.
    ///
    /// `+amount` when the envelope is the destination, `-amount` when it is
    /// the source, zero when it is neither or both.
    pub fn net_for(&self, envelope_id: EnvelopeId) -> Money {
        let mut net = Money::zero();
        if self.to == envelope_id {
            net += self.amount;
        }
        if self.from == envelope_id {
            net -= self.amount;
        }
        net
    }
}
