//! Lead scoring rule tables
//!
//! All scoring weights are data, not code: ordered keyword rules for the
//! reason and timeline sub-scores, fixed maps for conversation quality, a
//! core-city allow-list and the band thresholds. The engine in
//! `lead-portal-scoring` interprets these tables; changing a weight is a
//! config edit.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Scoring configuration, loadable from scoring.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum number of non-empty scoring inputs before a record is scored
    /// at all; fewer short-circuits to the insufficient-data sentinel.
    #[serde(default = "default_min_signals")]
    pub min_signals: usize,

    /// Reason/medical-need rules, priority ordered; first match wins.
    #[serde(default = "default_reason_rules")]
    pub reason_rules: Vec<KeywordRule>,

    /// Timeline/urgency rules, priority ordered; first match wins.
    #[serde(default = "default_timeline_rules")]
    pub timeline_rules: Vec<TimelineRule>,

    /// Cities that earn the full location score.
    #[serde(default = "default_core_cities")]
    pub core_cities: Vec<String>,

    /// Location score for a core city.
    #[serde(default = "default_core_city_score")]
    pub core_city_score: i64,

    /// Location score for any other non-empty city.
    #[serde(default = "default_other_city_score")]
    pub other_city_score: i64,

    /// Conversation-quality sub-scores.
    #[serde(default)]
    pub conversation: ConversationScores,

    /// Band thresholds over the summed score.
    #[serde(default)]
    pub bands: BandThresholds,
}

fn default_min_signals() -> usize {
    3
}

fn default_core_city_score() -> i64 {
    10
}

fn default_other_city_score() -> i64 {
    6
}

fn default_core_cities() -> Vec<String> {
    ["Mumbai", "Pune", "Surat", "Indore"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_reason_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(&["power"], 40),
        KeywordRule::new(&["medical"], 35),
        KeywordRule::new(&["lifestyle"], 25),
        KeywordRule::new(&["cosmetic"], 15),
        KeywordRule::new(&["explor"], 5),
    ]
}

fn default_timeline_rules() -> Vec<TimelineRule> {
    vec![
        TimelineRule::any(&["7", "15"], 20),
        TimelineRule::any(&["30"], 16),
        TimelineRule::all(&["1", "3"], 10),
        TimelineRule::all(&["3", "6"], 5),
        TimelineRule::any(&["not decided"], 2),
    ]
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_signals: default_min_signals(),
            reason_rules: default_reason_rules(),
            timeline_rules: default_timeline_rules(),
            core_cities: default_core_cities(),
            core_city_score: default_core_city_score(),
            other_city_score: default_other_city_score(),
            conversation: ConversationScores::default(),
            bands: BandThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path.as_ref().display().to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// True when `city` earns the full location score.
    pub fn is_core_city(&self, city: &str) -> bool {
        let needle = city.trim().to_lowercase();
        self.core_cities
            .iter()
            .any(|c| c.to_lowercase() == needle)
    }
}

/// A keyword rule: first case-insensitive substring hit takes the weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub weight: i64,
}

impl KeywordRule {
    pub fn new(keywords: &[&str], weight: i64) -> Self {
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            weight,
        }
    }

    /// Match against an already-lowercased input.
    pub fn matches(&self, input: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| input.contains(&k.to_lowercase()))
    }
}

/// A timeline rule: `any` tokens are alternatives, `all` tokens must each be
/// present. Either list may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimelineRule {
    #[serde(default)]
    pub any: Vec<String>,
    #[serde(default)]
    pub all: Vec<String>,
    pub weight: i64,
}

impl TimelineRule {
    pub fn any(tokens: &[&str], weight: i64) -> Self {
        Self {
            any: tokens.iter().map(|s| s.to_string()).collect(),
            all: Vec::new(),
            weight,
        }
    }

    pub fn all(tokens: &[&str], weight: i64) -> Self {
        Self {
            any: Vec::new(),
            all: tokens.iter().map(|s| s.to_string()).collect(),
            weight,
        }
    }

    /// Match against an already-lowercased input.
    pub fn matches(&self, input: &str) -> bool {
        let any_ok = self.any.is_empty()
            || self.any.iter().any(|t| input.contains(&t.to_lowercase()));
        let all_ok = !self.all.is_empty()
            && self.all.iter().all(|t| input.contains(&t.to_lowercase()));

        if self.any.is_empty() {
            all_ok
        } else if self.all.is_empty() {
            any_ok
        } else {
            any_ok && all_ok
        }
    }
}

/// Conversation-quality sub-scores: call outcome, consultation status and the
/// objection adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationScores {
    pub call_positive: i64,
    pub call_neutral: i64,
    pub call_negative: i64,
    pub call_no_response: i64,
    pub consultation_done: i64,
    pub consultation_scheduled: i64,
    pub consultation_declined: i64,
    pub consultation_not_offered: i64,
    /// Objections the rep can work around (timing, cost).
    pub objection_workable_bonus: i64,
    /// The only negative term in the formula.
    pub objection_not_interested_penalty: i64,
}

impl Default for ConversationScores {
    fn default() -> Self {
        Self {
            call_positive: 10,
            call_neutral: 6,
            call_negative: 2,
            call_no_response: 3,
            consultation_done: 15,
            consultation_scheduled: 12,
            consultation_declined: 6,
            consultation_not_offered: 2,
            objection_workable_bonus: 3,
            objection_not_interested_penalty: -10,
        }
    }
}

/// Band thresholds over the summed score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandThresholds {
    pub high: i64,
    pub medium: i64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            high: 70,
            medium: 40,
        }
    }
}
