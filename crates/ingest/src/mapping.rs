//! Canonical-schema mapping
//!
//! Each canonical field owns a fixed, versioned list of accepted source
//! headers. The first alias found in the upload wins; missing optional
//! columns map to empty strings. Only the phone column is mandatory.

use lead_portal_core::{normalize_phone, Lead};

use crate::{IngestError, RawTable};

/// Bumped whenever an alias list changes, so upload behavior is auditable.
pub const ALIAS_TABLE_VERSION: u32 = 1;

const PHONE_ALIASES: &[&str] = &[
    "phone",
    "phone number",
    "mobile",
    "mobile number",
    "contact",
    "contact number",
];

const NAME_ALIASES: &[&str] = &["name", "lead name", "customer name", "full name"];

const REASON_ALIASES: &[&str] = &["reason", "medical reason", "purpose", "reason for surgery"];

const TIMELINE_ALIASES: &[&str] = &["timeline", "urgency", "decision timeline", "timeframe"];

const CITY_ALIASES: &[&str] = &["city", "location"];

const OBJECTION_ALIASES: &[&str] = &["objection_type", "objection type", "objection"];

const CALL_OUTCOME_ALIASES: &[&str] = &["call_outcome", "call outcome", "outcome", "call status"];

const CONSULTATION_ALIASES: &[&str] = &[
    "consultation_status",
    "consultation status",
    "consultation",
];

const STATUS_ALIASES: &[&str] = &["status", "crm status", "lead status"];

/// Result of mapping an upload onto the canonical schema.
#[derive(Debug)]
pub struct MappedBatch {
    /// Canonical records, phones already normalized.
    pub leads: Vec<Lead>,
    /// Rows dropped because their phone cell normalized to nothing.
    pub skipped: usize,
}

/// Map a raw upload table to canonical lead records.
///
/// Fails before producing anything when no phone column can be resolved;
/// every other canonical field silently defaults to empty.
pub fn map_to_canonical(table: &RawTable) -> Result<MappedBatch, IngestError> {
    let phone_col = find_alias(table, PHONE_ALIASES).ok_or_else(|| {
        IngestError::MissingPhoneColumn {
            accepted: PHONE_ALIASES.join(", "),
        }
    })?;

    let name_col = find_alias(table, NAME_ALIASES);
    let reason_col = find_alias(table, REASON_ALIASES);
    let timeline_col = find_alias(table, TIMELINE_ALIASES);
    let city_col = find_alias(table, CITY_ALIASES);
    let objection_col = find_alias(table, OBJECTION_ALIASES);
    let call_outcome_col = find_alias(table, CALL_OUTCOME_ALIASES);
    let consultation_col = find_alias(table, CONSULTATION_ALIASES);
    let status_col = find_alias(table, STATUS_ALIASES);

    let mut leads = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;

    for (i, _) in table.rows.iter().enumerate() {
        let phone = normalize_phone(table.cell(i, phone_col));
        if phone.is_empty() {
            tracing::warn!(row = i + 2, "Skipping row with no usable phone value");
            skipped += 1;
            continue;
        }

        leads.push(Lead {
            phone,
            name: pick(table, i, name_col),
            reason: pick(table, i, reason_col),
            timeline: pick(table, i, timeline_col),
            city: pick(table, i, city_col),
            objection_type: pick(table, i, objection_col),
            call_outcome: pick(table, i, call_outcome_col),
            consultation_status: pick(table, i, consultation_col),
            status: pick(table, i, status_col),
            ..Default::default()
        });
    }

    tracing::info!(
        alias_table_version = ALIAS_TABLE_VERSION,
        mapped = leads.len(),
        skipped,
        "Mapped CSV upload to canonical schema"
    );

    Ok(MappedBatch { leads, skipped })
}

fn find_alias(table: &RawTable, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| table.header_index(a))
}

fn pick(table: &RawTable, row: usize, col: Option<usize>) -> String {
    col.map(|c| table.cell(row, c).trim().to_string())
        .unwrap_or_default()
}
