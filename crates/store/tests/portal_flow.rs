//! End-to-end flow over an in-memory sheet: raw CSV in, scored rows in the
//! sheet, one winning claim.

use std::sync::Arc;

use lead_portal_config::ScoringConfig;
use lead_portal_core::{IntentBand, IntentScore, LeadState};
use lead_portal_ingest::{map_to_canonical, parse_csv};
use lead_portal_store::{ClaimOutcome, InMemorySheet, LeadStore};

const CSV: &str = "Phone Number,Name,Reason,Timeline,City\n\
                   9876543210,Asha,high eye power,within 15 days,Mumbai\n\
                   9000000001,Vikram,,,Delhi\n";

fn ingest_and_score(csv: &str) -> Vec<lead_portal_core::Lead> {
    let table = parse_csv(csv).unwrap();
    let batch = map_to_canonical(&table).unwrap();
    let rules = ScoringConfig::default();
    let mut leads = batch.leads;
    for lead in &mut leads {
        lead_portal_scoring::apply(lead, &rules);
        lead.last_refresh = "2026-08-30T10:00:00+00:00".to_string();
    }
    leads
}

#[tokio::test]
async fn test_csv_to_sheet_to_claim() {
    let store = LeadStore::new(Arc::new(InMemorySheet::new()));

    let leads = ingest_and_score(CSV);
    let summary = store.upsert_batch(&leads).await.unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.updated, 0);

    // Asha: fresh reason (40) + 15-day timeline (20) + core city (10) = 70, High.
    let stored = store.load().await.unwrap();
    let asha = stored
        .iter()
        .find(|s| s.lead.phone == "9876543210")
        .unwrap();
    assert_eq!(asha.lead.intent_score, IntentScore::Scored(70));
    assert_eq!(asha.lead.intent_band, IntentBand::High);
    assert_eq!(asha.lead.lead_state, LeadState::HighIntent);

    // Vikram has only a city filled in; not enough signals to score.
    let vikram = stored
        .iter()
        .find(|s| s.lead.phone == "9000000001")
        .unwrap();
    assert_eq!(vikram.lead.intent_score, IntentScore::Insufficient);
    assert_eq!(vikram.lead.intent_band, IntentBand::InsufficientData);
    assert_eq!(vikram.lead.lead_state, LeadState::Open);

    // Rahul claims first and wins.
    let first = store.claim("9876543210", "Rahul").await.unwrap();
    assert!(matches!(first, ClaimOutcome::Picked { .. }));

    // Priya is told who beat her to it.
    let second = store.claim("9876543210", "Priya").await.unwrap();
    assert_eq!(second.message(), "Already picked by Rahul");
    assert!(!second.is_success());

    // Ownership landed in the sheet.
    let after = store.load().await.unwrap();
    let asha = after
        .iter()
        .find(|s| s.lead.phone == "9876543210")
        .unwrap();
    assert!(asha.lead.ownership.picked);
    assert_eq!(asha.lead.ownership.picked_by, "Rahul");
    assert!(!asha.lead.ownership.picked_at.is_empty());
}

#[tokio::test]
async fn test_reupload_preserves_claim() {
    let store = LeadStore::new(Arc::new(InMemorySheet::new()));

    store.upsert_batch(&ingest_and_score(CSV)).await.unwrap();
    store.claim("9876543210", "Rahul").await.unwrap();

    // Same phones arrive again with changed attributes.
    let updated_csv = "Phone Number,Name,Reason,Timeline,City\n\
                       9876543210,Asha,cosmetic,not decided,Delhi\n\
                       9000000001,Vikram,,,Delhi\n";
    let summary = store
        .upsert_batch(&ingest_and_score(updated_csv))
        .await
        .unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 2);

    let stored = store.load().await.unwrap();
    let asha = stored
        .iter()
        .find(|s| s.lead.phone == "9876543210")
        .unwrap();

    // Attributes and score moved with the upload...
    assert_eq!(asha.lead.city, "Delhi");
    assert_eq!(asha.lead.intent_band, IntentBand::Low);

    // ...but the claim survived untouched.
    assert!(asha.lead.ownership.picked);
    assert_eq!(asha.lead.ownership.picked_by, "Rahul");
}
