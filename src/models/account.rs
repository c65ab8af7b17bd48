//! Account model
//!
//! Accounts are named ledger accounts. The name doubles as a colon-delimited
//! namespace path ("assets:cash", "credit:visa") and the leading segment
//! decides whether an account counts as an asset for availability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, EnvelopeId};

/// Segment separator in account names
pub const NAME_SEPARATOR: char = ':';

/// A ledger account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,

    /// Account name, e.g. "assets:checking"
    pub name: String,

    /// Envelope that governs spending from this account, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_to: Option<EnvelopeId>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new unbound account
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            name: name.into(),
            bound_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new account bound to an envelope
    pub fn bound(name: impl Into<String>, envelope_id: EnvelopeId) -> Self {
        let mut account = Self::new(name);
        account.bound_to = Some(envelope_id);
        account
    }

    /// Set or clear the envelope binding
    pub fn bind(&mut self, envelope_id: Option<EnvelopeId>) {
        self.bound_to = envelope_id;
        self.updated_at = Utc::now();
    }

    /// Whether this account is bound to the given envelope
    pub fn is_bound_to(&self, envelope_id: EnvelopeId) -> bool {
        self.bound_to == Some(envelope_id)
    }

    /// Literal prefix match on the account name.
    ///
    /// `"assets"` matches both `"assets:cash"` and `"assetsfoo"`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }

    /// Name segments, e.g. `["assets", "cash"]`
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split(NAME_SEPARATOR)
    }

    /// The top-level namespace segment
    pub fn root(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        if self.segments().any(|s| s.trim().is_empty()) {
            return Err(AccountValidationError::EmptySegment);
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    EmptySegment,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
            Self::EmptySegment => {
                write!(f, "Account name cannot contain empty ':' segments")
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}
