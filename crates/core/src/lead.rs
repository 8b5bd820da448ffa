//! Lead record types
//!
//! One record per phone number. The free-text attributes come straight from
//! the CSV source; the intent fields are computed by the scoring engine; the
//! ownership triple is written only by the claim protocol.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::schema::SheetColumn;

/// Computed intent score, or the sentinel for records that did not carry
/// enough signals to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntentScore {
    Scored(i64),
    #[default]
    Insufficient,
}

impl IntentScore {
    pub const INSUFFICIENT: &'static str = "insufficient data";

    pub fn render(&self) -> String {
        match self {
            Self::Scored(n) => n.to_string(),
            Self::Insufficient => Self::INSUFFICIENT.to_string(),
        }
    }

    /// Parse a sheet cell. Anything that is not an integer is treated as the
    /// insufficient-data sentinel; scoring never errors and neither does
    /// reading back its output.
    pub fn parse_cell(cell: &str) -> Self {
        match cell.trim().parse::<i64>() {
            Ok(n) => Self::Scored(n),
            Err(_) => Self::Insufficient,
        }
    }
}

impl std::fmt::Display for IntentScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for IntentScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scored(n) => serializer.serialize_i64(*n),
            Self::Insufficient => serializer.serialize_str(Self::INSUFFICIENT),
        }
    }
}

impl<'de> Deserialize<'de> for IntentScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)
            .map_err(serde::de::Error::custom)?;
        Ok(match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Scored)
                .unwrap_or(Self::Insufficient),
            serde_json::Value::String(s) => Self::parse_cell(&s),
            _ => Self::Insufficient,
        })
    }
}

/// Intent band derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentBand {
    High,
    Medium,
    Low,
    #[default]
    InsufficientData,
}

impl IntentBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::InsufficientData => "Insufficient Data",
        }
    }

    pub fn parse_cell(cell: &str) -> Self {
        match cell.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::InsufficientData,
        }
    }
}

/// Derived lead state combining band, CRM status and consultation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadState {
    HighIntent,
    FollowUp,
    #[default]
    Open,
    Lost,
    LostRecoverable,
}

impl LeadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighIntent => "High Intent",
            Self::FollowUp => "Follow-up",
            Self::Open => "Open",
            Self::Lost => "Lost",
            Self::LostRecoverable => "Lost – Recoverable",
        }
    }

    pub fn parse_cell(cell: &str) -> Self {
        match cell.trim().to_lowercase().as_str() {
            "high intent" => Self::HighIntent,
            "follow-up" | "follow up" => Self::FollowUp,
            "lost" => Self::Lost,
            "lost – recoverable" | "lost - recoverable" => Self::LostRecoverable,
            _ => Self::Open,
        }
    }
}

/// The claim triple. Invariant: `picked` is true iff `picked_by` is non-empty
/// and `picked_at` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub picked: bool,
    pub picked_by: String,
    pub picked_at: String,
}

impl Ownership {
    pub fn claimed(rep: &str, at: &str) -> Self {
        Self {
            picked: true,
            picked_by: rep.to_string(),
            picked_at: at.to_string(),
        }
    }

    /// Parse the `picked` flag from a sheet cell. Sheets render booleans as
    /// TRUE/FALSE; manual edits and older rows may use 1/0 or lowercase.
    pub fn parse_picked_cell(cell: &str) -> bool {
        matches!(cell.trim().to_lowercase().as_str(), "true" | "1")
    }

    pub fn render_picked_cell(picked: bool) -> &'static str {
        if picked {
            "TRUE"
        } else {
            "FALSE"
        }
    }
}

/// A canonical lead record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lead {
    pub phone: String,
    pub name: String,
    pub reason: String,
    pub timeline: String,
    pub city: String,
    pub objection_type: String,
    pub call_outcome: String,
    pub consultation_status: String,
    pub status: String,
    pub intent_score: IntentScore,
    pub intent_band: IntentBand,
    pub lead_state: LeadState,
    #[serde(flatten)]
    pub ownership: Ownership,
    pub last_refresh: String,
}

impl Lead {
    /// Render one cell in the canonical sheet representation.
    pub fn cell(&self, column: SheetColumn) -> String {
        match column {
            SheetColumn::Phone => self.phone.clone(),
            SheetColumn::Name => self.name.clone(),
            SheetColumn::Reason => self.reason.clone(),
            SheetColumn::Timeline => self.timeline.clone(),
            SheetColumn::City => self.city.clone(),
            SheetColumn::ObjectionType => self.objection_type.clone(),
            SheetColumn::CallOutcome => self.call_outcome.clone(),
            SheetColumn::ConsultationStatus => self.consultation_status.clone(),
            SheetColumn::Status => self.status.clone(),
            SheetColumn::IntentScore => self.intent_score.render(),
            SheetColumn::IntentBand => self.intent_band.as_str().to_string(),
            SheetColumn::LeadState => self.lead_state.as_str().to_string(),
            SheetColumn::Picked => Ownership::render_picked_cell(self.ownership.picked).to_string(),
            SheetColumn::PickedBy => self.ownership.picked_by.clone(),
            SheetColumn::PickedAt => self.ownership.picked_at.clone(),
            SheetColumn::LastRefresh => self.last_refresh.clone(),
        }
    }

    /// Absorb one cell read back from the sheet.
    pub fn set_cell(&mut self, column: SheetColumn, value: &str) {
        match column {
            SheetColumn::Phone => self.phone = crate::phone::normalize_phone(value),
            SheetColumn::Name => self.name = value.to_string(),
            SheetColumn::Reason => self.reason = value.to_string(),
            SheetColumn::Timeline => self.timeline = value.to_string(),
            SheetColumn::City => self.city = value.to_string(),
            SheetColumn::ObjectionType => self.objection_type = value.to_string(),
            SheetColumn::CallOutcome => self.call_outcome = value.to_string(),
            SheetColumn::ConsultationStatus => self.consultation_status = value.to_string(),
            SheetColumn::Status => self.status = value.to_string(),
            SheetColumn::IntentScore => self.intent_score = IntentScore::parse_cell(value),
            SheetColumn::IntentBand => self.intent_band = IntentBand::parse_cell(value),
            SheetColumn::LeadState => self.lead_state = LeadState::parse_cell(value),
            SheetColumn::Picked => self.ownership.picked = Ownership::parse_picked_cell(value),
            SheetColumn::PickedBy => self.ownership.picked_by = value.to_string(),
            SheetColumn::PickedAt => self.ownership.picked_at = value.to_string(),
            SheetColumn::LastRefresh => self.last_refresh = value.to_string(),
        }
    }

    /// Full row in canonical column order.
    pub fn to_row(&self) -> Vec<String> {
        crate::schema::SHEET_COLUMNS
            .iter()
            .map(|c| self.cell(*c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SHEET_COLUMNS;

    #[test]
    fn test_intent_score_render_parse() {
        assert_eq!(IntentScore::Scored(70).render(), "70");
        assert_eq!(IntentScore::Insufficient.render(), "insufficient data");
        assert_eq!(IntentScore::parse_cell("70"), IntentScore::Scored(70));
        assert_eq!(
            IntentScore::parse_cell("insufficient data"),
            IntentScore::Insufficient
        );
        assert_eq!(IntentScore::parse_cell(""), IntentScore::Insufficient);
    }

    #[test]
    fn test_intent_score_json() {
        let scored = serde_json::to_value(IntentScore::Scored(42)).unwrap();
        assert_eq!(scored, serde_json::json!(42));
        let sentinel = serde_json::to_value(IntentScore::Insufficient).unwrap();
        assert_eq!(sentinel, serde_json::json!("insufficient data"));
        let back: IntentScore = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(back, IntentScore::Scored(42));
    }

    #[test]
    fn test_band_and_state_labels() {
        assert_eq!(IntentBand::InsufficientData.as_str(), "Insufficient Data");
        assert_eq!(LeadState::LostRecoverable.as_str(), "Lost – Recoverable");
        assert_eq!(
            LeadState::parse_cell("Lost - Recoverable"),
            LeadState::LostRecoverable
        );
        assert_eq!(LeadState::parse_cell("follow-up"), LeadState::FollowUp);
    }

    #[test]
    fn test_picked_cell() {
        assert!(Ownership::parse_picked_cell("TRUE"));
        assert!(Ownership::parse_picked_cell("true"));
        assert!(Ownership::parse_picked_cell("1"));
        assert!(!Ownership::parse_picked_cell(""));
        assert!(!Ownership::parse_picked_cell("FALSE"));
    }

    #[test]
    fn test_row_round_trip() {
        let lead = Lead {
            phone: "9876543210".to_string(),
            name: "Asha".to_string(),
            reason: "high eye power".to_string(),
            timeline: "within 15 days".to_string(),
            city: "Mumbai".to_string(),
            intent_score: IntentScore::Scored(70),
            intent_band: IntentBand::High,
            lead_state: LeadState::HighIntent,
            ownership: Ownership::claimed("Rahul", "2026-01-05T10:00:00+00:00"),
            last_refresh: "2026-01-05T09:00:00+00:00".to_string(),
            ..Default::default()
        };

        let row = lead.to_row();
        assert_eq!(row.len(), 16);

        let mut back = Lead::default();
        for (column, cell) in SHEET_COLUMNS.iter().zip(row.iter()) {
            back.set_cell(*column, cell);
        }
        assert_eq!(back.phone, "9876543210");
        assert_eq!(back.intent_score, IntentScore::Scored(70));
        assert_eq!(back.ownership, lead.ownership);
    }
}
