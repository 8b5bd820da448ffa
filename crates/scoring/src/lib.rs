//! Intent scoring engine
//!
//! A pure, total function from a lead record and a scoring rule table to an
//! intent score, band and lead state. No I/O, no hidden state; malformed
//! input degrades to a zero sub-score, never an error. Recomputing from the
//! same inputs always yields the same outputs.
//!
//! The formula:
//! - A minimum-data gate short-circuits records that carry fewer than
//!   `min_signals` non-empty inputs to the insufficient-data sentinel.
//! - Otherwise independent sub-scores are summed: reason keywords, timeline
//!   urgency, location, call outcome, consultation status, and an objection
//!   adjustment (the only negative term). The total can exceed 100.
//! - Band thresholds map the sum to High/Medium/Low; the lead state combines
//!   the band with the CRM status, consultation state and objection.

use lead_portal_config::{ConversationScores, ScoringConfig};
use lead_portal_core::{IntentBand, IntentScore, Lead, LeadState};

/// Result of scoring one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub score: IntentScore,
    pub band: IntentBand,
    pub state: LeadState,
}

/// Score one lead record against the rule table.
pub fn score(lead: &Lead, config: &ScoringConfig) -> ScoreOutcome {
    if signal_count(lead) < config.min_signals {
        return ScoreOutcome {
            score: IntentScore::Insufficient,
            band: IntentBand::InsufficientData,
            state: LeadState::Open,
        };
    }

    let total = reason_score(&lead.reason, config)
        + timeline_score(&lead.timeline, config)
        + location_score(&lead.city, config)
        + call_score(&lead.call_outcome, &config.conversation)
        + consultation_score(&lead.consultation_status, &config.conversation)
        + objection_adjustment(&lead.objection_type, &config.conversation);

    let band = if total >= config.bands.high {
        IntentBand::High
    } else if total >= config.bands.medium {
        IntentBand::Medium
    } else {
        IntentBand::Low
    };

    ScoreOutcome {
        score: IntentScore::Scored(total),
        band,
        state: derive_state(lead, band),
    }
}

/// Apply the scoring outcome to a record in place.
pub fn apply(lead: &mut Lead, config: &ScoringConfig) {
    let outcome = score(lead, config);
    lead.intent_score = outcome.score;
    lead.intent_band = outcome.band;
    lead.lead_state = outcome.state;
}

/// Count the non-empty scoring inputs for the minimum-data gate.
fn signal_count(lead: &Lead) -> usize {
    [
        &lead.reason,
        &lead.timeline,
        &lead.city,
        &lead.call_outcome,
        &lead.objection_type,
        &lead.consultation_status,
    ]
    .iter()
    .filter(|v| !v.trim().is_empty())
    .count()
}

fn reason_score(reason: &str, config: &ScoringConfig) -> i64 {
    let input = reason.trim().to_lowercase();
    if input.is_empty() {
        return 0;
    }
    config
        .reason_rules
        .iter()
        .find(|rule| rule.matches(&input))
        .map(|rule| rule.weight)
        .unwrap_or(0)
}

fn timeline_score(timeline: &str, config: &ScoringConfig) -> i64 {
    let input = timeline.trim().to_lowercase();
    if input.is_empty() {
        return 0;
    }
    config
        .timeline_rules
        .iter()
        .find(|rule| rule.matches(&input))
        .map(|rule| rule.weight)
        .unwrap_or(0)
}

fn location_score(city: &str, config: &ScoringConfig) -> i64 {
    if city.trim().is_empty() {
        0
    } else if config.is_core_city(city) {
        config.core_city_score
    } else {
        config.other_city_score
    }
}

fn call_score(outcome: &str, scores: &ConversationScores) -> i64 {
    match outcome.trim().to_lowercase().as_str() {
        "positive" => scores.call_positive,
        "neutral" => scores.call_neutral,
        "negative" => scores.call_negative,
        "no response" | "no-response" => scores.call_no_response,
        _ => 0,
    }
}

fn consultation_score(status: &str, scores: &ConversationScores) -> i64 {
    let status = status.trim().to_lowercase();
    match status.as_str() {
        "done" => scores.consultation_done,
        "scheduled" => scores.consultation_scheduled,
        "not offered" => scores.consultation_not_offered,
        _ if status.contains("declined") => scores.consultation_declined,
        _ => 0,
    }
}

fn objection_adjustment(objection: &str, scores: &ConversationScores) -> i64 {
    let objection = objection.trim().to_lowercase();
    if objection.contains("not interested") {
        scores.objection_not_interested_penalty
    } else if objection.contains("timing") || objection.contains("cost") {
        scores.objection_workable_bonus
    } else {
        0
    }
}

/// Lead-state derivation: the CRM-status-aware rule set.
fn derive_state(lead: &Lead, band: IntentBand) -> LeadState {
    let consultation_done = lead.consultation_status.trim().eq_ignore_ascii_case("done");
    let objection = lead.objection_type.trim().to_lowercase();

    if lead.status.trim().eq_ignore_ascii_case("lost") {
        let recoverable = matches!(band, IntentBand::High | IntentBand::Medium)
            && !consultation_done
            && !objection.contains("not interested")
            && !objection.contains("spam")
            && !objection.contains("invalid");
        return if recoverable {
            LeadState::LostRecoverable
        } else {
            LeadState::Lost
        };
    }

    if band == IntentBand::High && !consultation_done {
        LeadState::HighIntent
    } else {
        LeadState::FollowUp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(
        reason: &str,
        timeline: &str,
        city: &str,
        call_outcome: &str,
        consultation: &str,
        objection: &str,
        status: &str,
    ) -> Lead {
        Lead {
            phone: "9876543210".to_string(),
            reason: reason.to_string(),
            timeline: timeline.to_string(),
            city: city.to_string(),
            call_outcome: call_outcome.to_string(),
            consultation_status: consultation.to_string(),
            objection_type: objection.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimum_data_gate() {
        let config = ScoringConfig::default();
        let sparse = lead("", "", "Mumbai", "", "", "", "");
        let outcome = score(&sparse, &config);
        assert_eq!(outcome.score, IntentScore::Insufficient);
        assert_eq!(outcome.band, IntentBand::InsufficientData);
        assert_eq!(outcome.state, LeadState::Open);
    }

    #[test]
    fn test_end_to_end_reference_case() {
        let config = ScoringConfig::default();
        let record = lead("high eye power", "within 15 days", "Mumbai", "", "", "", "");
        let outcome = score(&record, &config);
        // 40 (reason) + 20 (timeline) + 10 (core city)
        assert_eq!(outcome.score, IntentScore::Scored(70));
        assert_eq!(outcome.band, IntentBand::High);
        assert_eq!(outcome.state, LeadState::HighIntent);
    }

    #[test]
    fn test_band_thresholds() {
        let config = ScoringConfig::default();
        // medical 35 + 30-days 16 + core city 10 + declined 6 + cost +3 = 70
        let exactly_70 = lead("medical", "within 30 days", "Pune", "", "declined", "cost", "");
        assert_eq!(score(&exactly_70, &config).score, IntentScore::Scored(70));
        assert_eq!(score(&exactly_70, &config).band, IntentBand::High);

        // medical 35 + 30-days 16 + core city 10 + declined 6 + nothing = 67
        let in_medium = lead("medical", "within 30 days", "Pune", "", "declined", "", "");
        assert_eq!(score(&in_medium, &config).band, IntentBand::Medium);

        // lifestyle 25 + other city 6 + no response 3 + not offered 2 + timing 3 = 39
        let just_low = lead("lifestyle", "", "Nagpur", "no response", "not offered", "timing", "");
        assert_eq!(score(&just_low, &config).score, IntentScore::Scored(39));
        assert_eq!(score(&just_low, &config).band, IntentBand::Low);

        // cosmetic 15 + 1-3 months 10 + core city 10 + not offered 2 + timing 3 = 40
        let exactly_40 = lead("cosmetic", "1-3 months", "Surat", "", "not offered", "timing", "");
        assert_eq!(score(&exactly_40, &config).score, IntentScore::Scored(40));
        assert_eq!(score(&exactly_40, &config).band, IntentBand::Medium);
    }

    #[test]
    fn test_not_interested_penalty() {
        let config = ScoringConfig::default();
        let record = lead(
            "cosmetic",
            "not decided",
            "Nagpur",
            "negative",
            "",
            "not interested",
            "",
        );
        // 15 + 2 + 6 + 2 - 10 = 15
        assert_eq!(score(&record, &config).score, IntentScore::Scored(15));
        assert_eq!(score(&record, &config).band, IntentBand::Low);
    }

    #[test]
    fn test_timeline_rule_precedence() {
        let config = ScoringConfig::default();
        // "within 15 days" contains "1" and "5"; the any{7,15} rule must win
        let record = lead("medical", "within 15 days", "Mumbai", "", "", "", "");
        // 35 + 20 + 10 = 65
        assert_eq!(score(&record, &config).score, IntentScore::Scored(65));
    }

    #[test]
    fn test_lost_states() {
        let config = ScoringConfig::default();

        let recoverable = lead(
            "high eye power",
            "within 15 days",
            "Mumbai",
            "",
            "scheduled",
            "timing",
            "Lost",
        );
        assert_eq!(score(&recoverable, &config).state, LeadState::LostRecoverable);

        let hard_lost = lead(
            "high eye power",
            "within 15 days",
            "Mumbai",
            "",
            "scheduled",
            "not interested",
            "Lost",
        );
        assert_eq!(score(&hard_lost, &config).state, LeadState::Lost);

        let done_lost = lead(
            "high eye power",
            "within 15 days",
            "Mumbai",
            "",
            "done",
            "timing",
            "lost",
        );
        assert_eq!(score(&done_lost, &config).state, LeadState::Lost);
    }

    #[test]
    fn test_high_band_after_consultation_is_follow_up() {
        let config = ScoringConfig::default();
        let record = lead("high eye power", "within 15 days", "Mumbai", "", "done", "", "");
        let outcome = score(&record, &config);
        assert_eq!(outcome.band, IntentBand::High);
        assert_eq!(outcome.state, LeadState::FollowUp);
    }

    #[test]
    fn test_deterministic() {
        let config = ScoringConfig::default();
        let record = lead("medical", "1 to 3 months", "Indore", "positive", "scheduled", "", "");
        let first = score(&record, &config);
        for _ in 0..10 {
            assert_eq!(score(&record, &config), first);
        }
    }

    #[test]
    fn test_apply_fills_intent_fields() {
        let config = ScoringConfig::default();
        let mut record = lead("high eye power", "within 15 days", "Mumbai", "", "", "", "");
        apply(&mut record, &config);
        assert_eq!(record.intent_score, IntentScore::Scored(70));
        assert_eq!(record.intent_band, IntentBand::High);
        assert_eq!(record.lead_state, LeadState::HighIntent);
    }
}
