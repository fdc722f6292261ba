//! Tests for the deal pipeline engine

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::*;
use crate::store::MemoryStore;
use crate::tests::test_util;
use crate::{assert_err, assert_ok};

fn service() -> DealService {
    test_util::setup();
    DealService::new(Arc::new(MemoryStore::<Deal>::new()))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn base_request() -> CreateDealRequest {
    CreateDealRequest {
        name: "Website redesign".to_string(),
        company: "Acme Corp".to_string(),
        contact_id: 1,
        contact_name: "Jane Cooper".to_string(),
        value: 12_000.0,
        stage: None,
        expected_close_date: None,
        notes: None,
    }
}

fn deal_at(stage: DealStage, value: f64, close: DateTime<Utc>) -> Deal {
    Deal {
        id: 0,
        name: "deal".to_string(),
        company: "Acme Corp".to_string(),
        contact_id: 1,
        contact_name: "Jane Cooper".to_string(),
        value,
        stage,
        probability: stage.default_probability(),
        expected_close_date: close,
        created_at: close,
        last_activity: close,
        notes: String::new(),
    }
}

#[test]
fn default_probability_is_total_and_in_range() {
    for stage in [
        DealStage::Lead,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ] {
        let p = stage.default_probability();
        assert!((0..=100).contains(&p), "{stage}: {p}");
    }

    assert_eq!(DealStage::Lead.default_probability(), 25);
    assert_eq!(DealStage::Qualified.default_probability(), 50);
    assert_eq!(DealStage::Proposal.default_probability(), 75);
    assert_eq!(DealStage::ClosedWon.default_probability(), 100);
    // Closed Lost was never in the probability table; it takes the
    // off-table fallback.
    assert_eq!(DealStage::ClosedLost.default_probability(), 25);
}

#[test]
fn stage_names_round_trip() {
    for stage in [
        DealStage::Lead,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ] {
        assert_eq!(stage.to_string().parse::<DealStage>().unwrap(), stage);
    }

    let err = "Negotiation".parse::<DealStage>().unwrap_err();
    assert!(matches!(err, CrmError::InvalidStage(_)));
}

#[test]
fn canonical_set_excludes_closed_lost() {
    assert_eq!(CANONICAL_STAGES.len(), 4);
    assert!(CANONICAL_STAGES.iter().all(|s| s.is_canonical()));
    assert!(!DealStage::ClosedLost.is_canonical());
}

#[tokio::test]
async fn create_defaults_to_lead() {
    let service = service();

    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    assert_eq!(deal.id, 1);
    assert_eq!(deal.stage, DealStage::Lead);
    assert_eq!(deal.probability, 25);
    assert_eq!(deal.created_at, now());
    assert_eq!(deal.last_activity, now());
    assert_eq!(deal.expected_close_date, now() + Duration::days(30));
}

#[tokio::test]
async fn create_derives_probability_from_given_stage() {
    let service = service();

    let deal = assert_ok!(
        service
            .create_deal(
                CreateDealRequest {
                    stage: Some(DealStage::Proposal),
                    ..base_request()
                },
                now(),
            )
            .await
    );

    assert_eq!(deal.stage, DealStage::Proposal);
    assert_eq!(deal.probability, 75);
}

#[tokio::test]
async fn create_rejects_missing_fields() {
    let service = service();

    let err = assert_err!(
        service
            .create_deal(
                CreateDealRequest {
                    name: "   ".to_string(),
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));

    let err = assert_err!(
        service
            .create_deal(
                CreateDealRequest {
                    value: 0.0,
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));
}

#[tokio::test]
async fn stage_change_resets_probability_to_default() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    let later = now() + Duration::hours(1);
    let updated = assert_ok!(
        service
            .update_deal(deal.id, DealPatch::stage(DealStage::Qualified), later)
            .await
    );

    assert_eq!(updated.stage, DealStage::Qualified);
    assert_eq!(updated.probability, 50);
    assert_eq!(updated.last_activity, later);
    assert_eq!(updated.created_at, now());
}

#[tokio::test]
async fn explicit_probability_overrides_stage_default() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    let updated = assert_ok!(
        service
            .update_deal(
                deal.id,
                DealPatch {
                    stage: Some(DealStage::Proposal),
                    probability: Some(90),
                    ..DealPatch::default()
                },
                now(),
            )
            .await
    );

    assert_eq!(updated.stage, DealStage::Proposal);
    assert_eq!(updated.probability, 90);
}

#[tokio::test]
async fn probability_only_edit_is_kept_verbatim() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    let updated = assert_ok!(
        service
            .update_deal(
                deal.id,
                DealPatch {
                    probability: Some(5),
                    ..DealPatch::default()
                },
                now(),
            )
            .await
    );

    assert_eq!(updated.stage, DealStage::Lead);
    assert_eq!(updated.probability, 5);
}

#[tokio::test]
async fn same_stage_patch_does_not_reset_probability() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    assert_ok!(
        service
            .update_deal(
                deal.id,
                DealPatch {
                    probability: Some(90),
                    ..DealPatch::default()
                },
                now(),
            )
            .await
    );

    // Re-stating the current stage is not a stage change.
    let updated = assert_ok!(
        service
            .update_deal(deal.id, DealPatch::stage(DealStage::Lead), now())
            .await
    );
    assert_eq!(updated.probability, 90);
}

#[tokio::test]
async fn patch_merges_field_by_field() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    let updated = assert_ok!(
        service
            .update_deal(
                deal.id,
                DealPatch {
                    value: Some(20_000.0),
                    notes: Some("revised scope".to_string()),
                    ..DealPatch::default()
                },
                now(),
            )
            .await
    );

    assert_eq!(updated.value, 20_000.0);
    assert_eq!(updated.notes, "revised scope");
    assert_eq!(updated.name, "Website redesign");
    assert_eq!(updated.company, "Acme Corp");
    assert_eq!(updated.contact_name, "Jane Cooper");
}

#[tokio::test]
async fn update_missing_deal_is_not_found() {
    let service = service();

    let err = assert_err!(
        service
            .update_deal(99, DealPatch::default(), now())
            .await
    );
    assert!(matches!(err, CrmError::NotFound(_)));
}

#[tokio::test]
async fn delete_twice_surfaces_not_found() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    assert_ok!(service.delete_deal(deal.id).await);
    let err = assert_err!(service.delete_deal(deal.id).await);
    assert!(matches!(err, CrmError::NotFound(_)));
}

#[tokio::test]
async fn move_stage_rejects_off_board_stage() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    let err = assert_err!(
        service
            .move_stage(deal.id, DealStage::ClosedLost, now())
            .await
    );
    assert!(matches!(err, CrmError::InvalidStage(_)));

    // The deal is untouched by the rejected move.
    let fresh = assert_ok!(service.get_deal(deal.id).await);
    assert_eq!(fresh.stage, DealStage::Lead);
}

#[tokio::test]
async fn closed_lost_is_reachable_through_update() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    let updated = assert_ok!(
        service
            .update_deal(deal.id, DealPatch::stage(DealStage::ClosedLost), now())
            .await
    );

    assert_eq!(updated.stage, DealStage::ClosedLost);
    assert_eq!(updated.probability, 25);
}

#[tokio::test]
async fn move_onto_current_column_still_bumps_last_activity() {
    let service = service();
    let deal = assert_ok!(service.create_deal(base_request(), now()).await);

    let later = now() + Duration::hours(2);
    let moved = assert_ok!(service.move_stage(deal.id, DealStage::Lead, later).await);

    assert_eq!(moved.stage, DealStage::Lead);
    assert_eq!(moved.last_activity, later);
}

#[tokio::test]
async fn deals_by_stage_filters() {
    let service = service();
    assert_ok!(service.create_deal(base_request(), now()).await);
    let other = assert_ok!(
        service
            .create_deal(
                CreateDealRequest {
                    name: "Support contract".to_string(),
                    stage: Some(DealStage::Proposal),
                    ..base_request()
                },
                now(),
            )
            .await
    );

    let proposals = assert_ok!(service.deals_by_stage(DealStage::Proposal).await);
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].id, other.id);
}

#[test]
fn funnel_has_four_rows_in_canonical_order() {
    // Deliberately shuffled input, with a Closed Lost deal that belongs to
    // no funnel row.
    let deals = vec![
        deal_at(DealStage::ClosedWon, 2_000.0, now()),
        deal_at(DealStage::Lead, 1_000.0, now()),
        deal_at(DealStage::ClosedLost, 9_000.0, now()),
        deal_at(DealStage::Lead, 500.0, now()),
        deal_at(DealStage::Proposal, 3_000.0, now()),
    ];

    let funnel = compute_funnel(&deals);
    assert_eq!(funnel.len(), 4);
    assert_eq!(
        funnel.iter().map(|s| s.stage).collect::<Vec<_>>(),
        CANONICAL_STAGES.to_vec()
    );

    assert_eq!(funnel[0].count, 2);
    assert_eq!(funnel[0].total_value, 1_500.0);
    assert_eq!(funnel[1].count, 0);
    assert_eq!(funnel[1].total_value, 0.0);
    assert_eq!(funnel[2].count, 1);
    assert_eq!(funnel[3].count, 1);
    assert_eq!(funnel[3].total_value, 2_000.0);
}

#[test]
fn funnel_of_empty_snapshot_is_all_zero() {
    let funnel = compute_funnel(&[]);
    assert_eq!(funnel.len(), 4);
    assert!(funnel.iter().all(|s| s.count == 0 && s.total_value == 0.0));
}

#[test]
fn summary_matches_board_scenario() {
    let deals = vec![
        deal_at(DealStage::Lead, 1_000.0, now()),
        deal_at(DealStage::ClosedWon, 2_000.0, now()),
    ];

    let summary = compute_summary(&deals, now());
    assert_eq!(summary.total_pipeline_value, 1_000.0);
    assert_eq!(summary.active_deals_count, 1);
    assert_eq!(summary.monthly_closed_deals_count, 1);
    assert_eq!(summary.monthly_closed_deals_value, 2_000.0);
    assert_eq!(summary.win_rate, 100);
}

#[test]
fn win_rate_is_zero_without_closed_deals() {
    let deals = vec![
        deal_at(DealStage::Lead, 1_000.0, now()),
        deal_at(DealStage::Proposal, 4_000.0, now()),
    ];

    let summary = compute_summary(&deals, now());
    assert_eq!(summary.win_rate, 0);
}

#[test]
fn win_rate_counts_closed_lost_and_rounds() {
    let deals = vec![
        deal_at(DealStage::ClosedWon, 1_000.0, now()),
        deal_at(DealStage::ClosedWon, 1_000.0, now()),
        deal_at(DealStage::ClosedLost, 1_000.0, now()),
    ];

    let summary = compute_summary(&deals, now());
    assert_eq!(summary.win_rate, 67);
    // Closed deals sit outside the open pipeline.
    assert_eq!(summary.total_pipeline_value, 0.0);
    assert_eq!(summary.active_deals_count, 0);
}

#[test]
fn monthly_closings_need_matching_month_and_year() {
    let last_month = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
    let last_year = Utc.with_ymd_and_hms(2023, 6, 20, 0, 0, 0).unwrap();
    let deals = vec![
        deal_at(DealStage::ClosedWon, 2_000.0, now()),
        deal_at(DealStage::ClosedWon, 3_000.0, last_month),
        deal_at(DealStage::ClosedWon, 4_000.0, last_year),
    ];

    let summary = compute_summary(&deals, now());
    assert_eq!(summary.monthly_closed_deals_count, 1);
    assert_eq!(summary.monthly_closed_deals_value, 2_000.0);
    assert_eq!(summary.win_rate, 100);
}

#[test]
fn analytics_are_pure_over_a_snapshot() {
    let deals = vec![
        deal_at(DealStage::Lead, 1_000.0, now()),
        deal_at(DealStage::ClosedWon, 2_000.0, now()),
        deal_at(DealStage::ClosedLost, 3_000.0, now()),
    ];

    assert_eq!(compute_funnel(&deals), compute_funnel(&deals));
    assert_eq!(compute_summary(&deals, now()), compute_summary(&deals, now()));
}
