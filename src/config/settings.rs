//! User settings for the ledger
//!
//! Manages preferences such as the currency symbol, the asset account prefix,
//! the envelopes created on first run, and how available funds are computed.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;

/// How unallocated funds are derived from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AvailableCalculation {
    /// Every positive asset entry counts as inflow
    #[default]
    Parity,
    /// Inflow already routed to an ordinary envelope in the same transaction
    /// is not counted again
    ExcludeAllocated,
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when formatting amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Account name prefix that marks asset accounts
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,

    /// Name given to the Available envelope when seeding
    #[serde(default = "default_available_name")]
    pub available_name: String,

    /// Ordinary envelopes created on first run
    #[serde(default = "default_seed_envelopes")]
    pub seed_envelopes: Vec<String>,

    #[serde(default)]
    pub available_calculation: AvailableCalculation,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_asset_prefix() -> String {
    "assets".to_string()
}

fn default_available_name() -> String {
    "Available".to_string()
}

fn default_seed_envelopes() -> Vec<String> {
    vec![
        "Groceries".to_string(),
        "Rent".to_string(),
        "Utilities".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            asset_prefix: default_asset_prefix(),
            available_name: default_available_name(),
            seed_envelopes: default_seed_envelopes(),
            available_calculation: AvailableCalculation::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or default settings if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
