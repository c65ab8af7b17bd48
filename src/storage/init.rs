//! Storage initialization
//!
//! Handles first-run seeding of the Available envelope and the starter
//! envelopes named in settings.

use crate::audit::AuditEntry;
use crate::config::settings::Settings;
use crate::error::LedgerError;
use crate::models::Envelope;

use super::Storage;

/// Seed a fresh ledger.
///
/// Only runs when there are no accounts and no envelopes at all, so calling
/// it again never duplicates the Available envelope or the starter set.
/// Returns whether anything was created.
pub fn seed_if_empty(storage: &Storage, settings: &Settings) -> Result<bool, LedgerError> {
    if !storage.is_empty()? {
        tracing::debug!("ledger already has data, skipping seed");
        return Ok(false);
    }

    let mut seeded = vec![Envelope::available(settings.available_name.trim())];
    for name in &settings.seed_envelopes {
        let name = name.trim();
        if name.is_empty() || seeded.iter().any(|e| e.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        seeded.push(Envelope::new(name));
    }

    if seeded.len() < 2 {
        return Err(LedgerError::Config(
            "seed_envelopes must name at least one envelope besides the Available one".into(),
        ));
    }

    for envelope in &seeded {
        envelope
            .validate()
            .map_err(|e| LedgerError::Config(e.to_string()))?;
    }

    let entries: Vec<AuditEntry> = seeded.iter().map(AuditEntry::envelope_created).collect();
    storage.envelopes.insert_many(seeded)?;
    storage.record_all(&entries);

    tracing::info!(
        envelopes = storage.envelopes.count()?,
        "seeded empty ledger"
    );
    Ok(true)
}
