//! Envelope display formatting

use std::collections::HashMap;

use crate::models::{Envelope, EnvelopeId, Money, Stash};

/// Format envelopes as a table, marking the Available envelope
pub fn format_envelope_list(envelopes: &[Envelope], currency_symbol: &str) -> String {
    if envelopes.is_empty() {
        return "No envelopes found.\n".to_string();
    }

    let name_width = envelopes
        .iter()
        .map(|e| e.name.len() + 2)
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>14}\n",
        "Name", "Amount",
    ));
    output.push_str(&format!("{:-<name_width$}  {:->14}\n", "", ""));

    for envelope in envelopes {
        let name = if envelope.is_available() {
            format!("{} *", envelope.name)
        } else {
            envelope.name.clone()
        };
        output.push_str(&format!(
            "{:<name_width$}  {:>14}\n",
            name,
            envelope.amount.format_with_symbol(currency_symbol),
        ));
    }

    output
}

/// Format one envelope with its spending and stash history
pub fn format_envelope_details(
    envelope: &Envelope,
    spent: Money,
    bound_accounts: &[String],
    stashes: &[Stash],
    names: &HashMap<EnvelopeId, String>,
    currency_symbol: &str,
) -> String {
    let money = |m: Money| m.format_with_symbol(currency_symbol);
    let mut output = String::new();

    output.push_str(&format!("Envelope: {}\n", envelope.name));
    output.push_str(&format!("  ID:       {}\n", envelope.id));
    output.push_str(&format!("  Kind:     {}\n", envelope.kind));
    output.push_str(&format!("  Amount:   {}\n", money(envelope.amount)));
    output.push_str(&format!("  Spent:    {}\n", money(spent)));
    output.push_str(&format!("  Version:  {}\n", envelope.version));

    if !bound_accounts.is_empty() {
        output.push_str(&format!("  Accounts: {}\n", bound_accounts.join(", ")));
    }

    if !stashes.is_empty() {
        output.push_str("\nStashes:\n");
        for stash in stashes {
            let name = |id: EnvelopeId| {
                names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| format!("{} (deleted)", id))
            };
            output.push_str(&format!(
                "  {}  {} -> {}  {}\n",
                stash.created_at.format("%Y-%m-%d %H:%M"),
                name(stash.from),
                name(stash.to),
                money(stash.amount)
            ));
        }
    }

    output
}
