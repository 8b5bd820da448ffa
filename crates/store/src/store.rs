//! Lead store operations: load, upsert-merge, claim
//!
//! Every operation reads the backing table fresh; nothing is cached across
//! calls. Claims are serialized per phone key (see crate docs).

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use lead_portal_core::{
    column_index, header_row, normalize_phone, Lead, Ownership, SheetColumn, SHEET_COLUMNS,
};

use crate::{SheetClient, StoreError};

/// A lead plus the 1-based backing row it was read from.
#[derive(Debug, Clone)]
pub struct StoredLead {
    pub row: usize,
    pub lead: Lead,
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Result of a claim attempt. Conflicts and misses are values, not errors:
/// the caller renders `message()` either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Picked { picked_at: String },
    AlreadyPicked { by: String },
    NotFound,
}

impl ClaimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Picked { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Picked { .. } => "Lead picked".to_string(),
            Self::AlreadyPicked { by } => format!("Already picked by {}", by),
            Self::NotFound => "Lead not found".to_string(),
        }
    }
}

/// Resolved 0-based positions of the canonical columns in a sheet header.
struct ColumnMap {
    positions: [Option<usize>; SHEET_COLUMNS.len()],
}

impl ColumnMap {
    fn resolve(header: &[String]) -> Self {
        let mut positions = [None; SHEET_COLUMNS.len()];
        for (slot, column) in SHEET_COLUMNS.iter().enumerate() {
            positions[slot] = header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column.as_str()));
        }
        Self { positions }
    }

    fn get(&self, column: SheetColumn) -> Option<usize> {
        self.positions[column_index(column)]
    }

    fn require(&self, column: SheetColumn) -> Result<usize, StoreError> {
        self.get(column)
            .ok_or(StoreError::SchemaMismatch(column.as_str()))
    }
}

/// The lead store. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct LeadStore {
    sheet: Arc<dyn SheetClient>,
    claim_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl LeadStore {
    pub fn new(sheet: Arc<dyn SheetClient>) -> Self {
        Self {
            sheet,
            claim_locks: Arc::new(DashMap::new()),
        }
    }

    /// Load every lead, tagged with its backing row. Fresh read each call.
    pub async fn load(&self) -> Result<Vec<StoredLead>, StoreError> {
        let rows = self.sheet.read_all().await?;
        let Some((header, data)) = rows.split_first() else {
            return Ok(Vec::new());
        };

        let columns = ColumnMap::resolve(header);
        let mut leads = Vec::with_capacity(data.len());
        for (i, row) in data.iter().enumerate() {
            let mut lead = Lead::default();
            for column in SHEET_COLUMNS {
                if let Some(pos) = columns.get(column) {
                    lead.set_cell(column, row.get(pos).map(String::as_str).unwrap_or(""));
                }
            }
            leads.push(StoredLead { row: i + 2, lead });
        }
        Ok(leads)
    }

    /// Upsert a batch of scored records.
    ///
    /// Existing rows (matched by normalized phone) get every field updated
    /// except the ownership triple, which an upsert never touches. Unknown
    /// phones are appended with ownership forced to unclaimed, whatever the
    /// incoming record says. A phone repeated within the batch collapses to
    /// its last record, keeping one row per phone. Fails before any write
    /// when a record lacks a phone key.
    pub async fn upsert_batch(&self, batch: &[Lead]) -> Result<UpsertSummary, StoreError> {
        let mut normalized = batch.to_vec();
        for lead in &mut normalized {
            lead.phone = normalize_phone(&lead.phone);
            if lead.phone.is_empty() {
                return Err(StoreError::MissingPhone);
            }
        }

        // Raw exports routinely repeat a phone; last occurrence wins.
        let mut incoming: Vec<Lead> = Vec::with_capacity(normalized.len());
        let mut seen = std::collections::HashMap::new();
        for lead in normalized {
            match seen.get(&lead.phone) {
                Some(&slot) => incoming[slot] = lead,
                None => {
                    seen.insert(lead.phone.clone(), incoming.len());
                    incoming.push(lead);
                }
            }
        }

        let rows = self.sheet.read_all().await?;
        let mut summary = UpsertSummary::default();

        let Some((header, data)) = rows.split_first() else {
            // Empty store: header row first, then every record verbatim
            // (ownership cleared).
            self.sheet.append_row(header_row()).await?;
            for lead in &incoming {
                self.sheet.append_row(unclaimed(lead).to_row()).await?;
                summary.inserted += 1;
            }
            tracing::info!(inserted = summary.inserted, "Initialized empty lead sheet");
            return Ok(summary);
        };

        let columns = ColumnMap::resolve(header);
        let phone_pos = columns.require(SheetColumn::Phone)?;

        // Index current rows by normalized phone -> 1-based row
        let mut by_phone = std::collections::HashMap::new();
        for (i, row) in data.iter().enumerate() {
            let key = normalize_phone(row.get(phone_pos).map(String::as_str).unwrap_or(""));
            if !key.is_empty() {
                by_phone.insert(key, i + 2);
            }
        }

        for lead in &incoming {
            match by_phone.get(&lead.phone) {
                Some(&row) => {
                    for column in SHEET_COLUMNS {
                        if column.is_ownership() {
                            continue;
                        }
                        if let Some(pos) = columns.get(column) {
                            self.sheet
                                .write_cell(row, pos + 1, &lead.cell(column))
                                .await?;
                        }
                    }
                    summary.updated += 1;
                }
                None => {
                    let cleared = unclaimed(lead);
                    let mut row = vec![String::new(); header.len()];
                    for column in SHEET_COLUMNS {
                        if let Some(pos) = columns.get(column) {
                            row[pos] = cleared.cell(column);
                        }
                    }
                    self.sheet.append_row(row).await?;
                    summary.inserted += 1;
                }
            }
        }

        tracing::info!(
            inserted = summary.inserted,
            updated = summary.updated,
            "Upserted lead batch"
        );
        Ok(summary)
    }

    /// Claim a lead for a representative.
    ///
    /// The read-check-write runs under a per-phone mutex, so concurrent
    /// claims for the same phone through this store resolve to exactly one
    /// success; the loser sees the winner's name.
    pub async fn claim(&self, phone: &str, rep: &str) -> Result<ClaimOutcome, StoreError> {
        let key = normalize_phone(phone);
        if key.is_empty() {
            return Ok(ClaimOutcome::NotFound);
        }

        let lock = self
            .claim_locks
            .entry(key.clone())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        let rows = self.sheet.read_all().await?;
        let Some((header, data)) = rows.split_first() else {
            return Ok(ClaimOutcome::NotFound);
        };

        let columns = ColumnMap::resolve(header);
        let phone_pos = columns.require(SheetColumn::Phone)?;
        let picked_pos = columns.require(SheetColumn::Picked)?;
        let picked_by_pos = columns.require(SheetColumn::PickedBy)?;
        let picked_at_pos = columns.require(SheetColumn::PickedAt)?;

        for (i, row) in data.iter().enumerate() {
            let cell = |pos: usize| row.get(pos).map(String::as_str).unwrap_or("");
            if normalize_phone(cell(phone_pos)) != key {
                continue;
            }

            if Ownership::parse_picked_cell(cell(picked_pos)) {
                let by = cell(picked_by_pos).to_string();
                tracing::debug!(phone = %key, owner = %by, "Claim rejected: already picked");
                // Picked is terminal; later claimants read TRUE without
                // needing the serialization, so the lock entry can go.
                self.claim_locks.remove(&key);
                return Ok(ClaimOutcome::AlreadyPicked { by });
            }

            let row_idx = i + 2;
            let picked_at = Utc::now().to_rfc3339();
            self.sheet
                .write_cell(row_idx, picked_pos + 1, Ownership::render_picked_cell(true))
                .await?;
            self.sheet.write_cell(row_idx, picked_by_pos + 1, rep).await?;
            self.sheet
                .write_cell(row_idx, picked_at_pos + 1, &picked_at)
                .await?;

            tracing::info!(phone = %key, rep = %rep, "Lead claimed");
            self.claim_locks.remove(&key);
            return Ok(ClaimOutcome::Picked { picked_at });
        }

        Ok(ClaimOutcome::NotFound)
    }
}

/// Copy of a lead with the ownership triple reset to unclaimed.
fn unclaimed(lead: &Lead) -> Lead {
    Lead {
        ownership: Ownership::default(),
        ..lead.clone()
    }
}
