//! Envelope model
//!
//! An envelope is a named budget category holding a running balance. One
//! distinguished envelope, tagged [`EnvelopeKind::Available`], holds funds
//! that have not been budgeted yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::EnvelopeId;
use super::money::Money;

/// Which role an envelope plays in the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    /// A regular spending category
    #[default]
    Ordinary,
    /// Unallocated funds
    Available,
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinary => write!(f, "Ordinary"),
            Self::Available => write!(f, "Available"),
        }
    }
}

/// A budget envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique identifier
    pub id: EnvelopeId,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub kind: EnvelopeKind,

    /// Running allocated balance
    pub amount: Money,

    /// Bumped on every amount change, used to detect concurrent writers
    #[serde(default)]
    pub version: u64,

    /// When the envelope was created
    pub created_at: DateTime<Utc>,

    /// When the envelope was last modified
    pub updated_at: DateTime<Utc>,
}

impl Envelope {
    /// Create a new ordinary envelope with a zero balance
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, EnvelopeKind::Ordinary)
    }

    /// Create the Available envelope
    pub fn available(name: impl Into<String>) -> Self {
        Self::with_kind(name, EnvelopeKind::Available)
    }

    fn with_kind(name: impl Into<String>, kind: EnvelopeKind) -> Self {
        let now = Utc::now();
        Self {
            id: EnvelopeId::new(),
            name: name.into(),
            kind,
            amount: Money::zero(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.kind == EnvelopeKind::Available
    }

    /// Adjust the balance by a signed delta and bump the version
    pub fn adjust(&mut self, delta: Money) {
        self.amount += delta;
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Validate the envelope
    pub fn validate(&self) -> Result<(), EnvelopeValidationError> {
        if self.name.trim().is_empty() {
            return Err(EnvelopeValidationError::EmptyName);
        }

        if self.name.len() > 50 {
            return Err(EnvelopeValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for envelopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for EnvelopeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Envelope name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Envelope name too long ({} chars, max 50)", len)
            }
        }
    }
}

impl std::error::Error for EnvelopeValidationError {}
