//! Canonical backing-sheet schema
//!
//! The shared sheet has a fixed column layout: one header row followed by one
//! data row per lead. Row and column indices are 1-based (row 1 is the
//! header), matching the backing table service.

/// A column in the canonical sheet layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetColumn {
    Phone,
    Name,
    Reason,
    Timeline,
    City,
    ObjectionType,
    CallOutcome,
    ConsultationStatus,
    Status,
    IntentScore,
    IntentBand,
    LeadState,
    Picked,
    PickedBy,
    PickedAt,
    LastRefresh,
}

impl SheetColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Name => "name",
            Self::Reason => "reason",
            Self::Timeline => "timeline",
            Self::City => "city",
            Self::ObjectionType => "objection_type",
            Self::CallOutcome => "call_outcome",
            Self::ConsultationStatus => "consultation_status",
            Self::Status => "status",
            Self::IntentScore => "intent_score",
            Self::IntentBand => "intent_band",
            Self::LeadState => "lead_state",
            Self::Picked => "picked",
            Self::PickedBy => "picked_by",
            Self::PickedAt => "picked_at",
            Self::LastRefresh => "last_refresh",
        }
    }

    /// The ownership triple is written only by `claim` and must never be
    /// touched by an upsert.
    pub fn is_ownership(&self) -> bool {
        matches!(self, Self::Picked | Self::PickedBy | Self::PickedAt)
    }
}

/// Canonical column order for the backing sheet header row.
pub const SHEET_COLUMNS: [SheetColumn; 16] = [
    SheetColumn::Phone,
    SheetColumn::Name,
    SheetColumn::Reason,
    SheetColumn::Timeline,
    SheetColumn::City,
    SheetColumn::ObjectionType,
    SheetColumn::CallOutcome,
    SheetColumn::ConsultationStatus,
    SheetColumn::Status,
    SheetColumn::IntentScore,
    SheetColumn::IntentBand,
    SheetColumn::LeadState,
    SheetColumn::Picked,
    SheetColumn::PickedBy,
    SheetColumn::PickedAt,
    SheetColumn::LastRefresh,
];

/// Zero-based position of a column in the canonical layout.
pub fn column_index(column: SheetColumn) -> usize {
    SHEET_COLUMNS
        .iter()
        .position(|c| *c == column)
        .unwrap_or_default()
}

/// The canonical header row, ready to write to an empty sheet.
pub fn header_row() -> Vec<String> {
    SHEET_COLUMNS.iter().map(|c| c.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order() {
        assert_eq!(column_index(SheetColumn::Phone), 0);
        assert_eq!(column_index(SheetColumn::Picked), 12);
        assert_eq!(column_index(SheetColumn::LastRefresh), 15);
    }

    #[test]
    fn test_ownership_columns() {
        let owned: Vec<_> = SHEET_COLUMNS.iter().filter(|c| c.is_ownership()).collect();
        assert_eq!(owned.len(), 3);
    }

    #[test]
    fn test_header_row() {
        let header = header_row();
        assert_eq!(header.len(), 16);
        assert_eq!(header[0], "phone");
        assert_eq!(header[15], "last_refresh");
    }
}
