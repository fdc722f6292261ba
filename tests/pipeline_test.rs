//! End-to-end pipeline flow over the public crate API.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crmcore::activities::{ActivityType, CreateActivityRequest};
use crmcore::companies::CreateCompanyRequest;
use crmcore::contacts::CreateContactRequest;
use crmcore::deals::{CreateDealRequest, DealPatch, DealStage};
use crmcore::{CrmError, CrmState};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn deal_lifecycle_drives_the_dashboard() {
    let crm = CrmState::in_memory();

    let contact = crm
        .contacts
        .create_contact(
            CreateContactRequest {
                name: "Jane Cooper".to_string(),
                email: "jane@acme.test".to_string(),
                phone: Some("555-0101".to_string()),
                company: Some("Acme Corp".to_string()),
                position: Some("VP Sales".to_string()),
                tags: None,
                notes: None,
            },
            now(),
        )
        .await
        .unwrap();

    crm.companies
        .create_company(
            CreateCompanyRequest {
                name: "Acme Corp".to_string(),
                industry: "Manufacturing".to_string(),
                website: None,
                description: None,
            },
            now(),
        )
        .await
        .unwrap();

    let big = crm
        .deals
        .create_deal(
            CreateDealRequest {
                name: "Website redesign".to_string(),
                company: "Acme Corp".to_string(),
                contact_id: contact.id,
                contact_name: contact.name.clone(),
                value: 12_000.0,
                stage: None,
                expected_close_date: Some(now() + Duration::days(10)),
                notes: Some("inbound lead".to_string()),
            },
            now(),
        )
        .await
        .unwrap();
    let small = crm
        .deals
        .create_deal(
            CreateDealRequest {
                name: "Support contract".to_string(),
                company: "Acme Corp".to_string(),
                contact_id: contact.id,
                contact_name: contact.name.clone(),
                value: 3_000.0,
                stage: Some(DealStage::Qualified),
                expected_close_date: Some(now() + Duration::days(40)),
                notes: None,
            },
            now(),
        )
        .await
        .unwrap();

    assert_eq!(big.stage, DealStage::Lead);
    assert_eq!(big.probability, 25);
    assert_eq!(small.probability, 50);

    crm.activities
        .create_activity(
            CreateActivityRequest {
                contact_id: contact.id,
                activity_type: ActivityType::Call,
                description: "Discovery call".to_string(),
                timestamp: None,
                created_by: None,
                status: None,
            },
            now(),
        )
        .await
        .unwrap();

    // Drag the big deal across the board to Closed Won.
    let mut t = now();
    for stage in [
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::ClosedWon,
    ] {
        t += Duration::days(1);
        let moved = crm.deals.move_stage(big.id, stage, t).await.unwrap();
        assert_eq!(moved.probability, stage.default_probability());
        assert_eq!(moved.last_activity, t);
    }

    let funnel = crm.deals.funnel().await.unwrap();
    assert_eq!(funnel.len(), 4);
    assert_eq!(funnel[1].stage, DealStage::Qualified);
    assert_eq!(funnel[1].count, 1);
    assert_eq!(funnel[1].total_value, 3_000.0);
    assert_eq!(funnel[3].count, 1);
    assert_eq!(funnel[3].total_value, 12_000.0);

    let summary = crm.deals.summary(now()).await.unwrap();
    assert_eq!(summary.total_pipeline_value, 3_000.0);
    assert_eq!(summary.active_deals_count, 1);
    assert_eq!(summary.monthly_closed_deals_count, 1);
    assert_eq!(summary.monthly_closed_deals_value, 12_000.0);
    assert_eq!(summary.win_rate, 100);

    // Company rollups see both deals by name.
    let companies = crm.companies.list_companies().await.unwrap();
    assert_eq!(companies[0].contact_count, 1);
    assert_eq!(companies[0].total_deal_value, 15_000.0);

    // A manual probability edit on the open deal sticks.
    let tweaked = crm
        .deals
        .update_deal(
            small.id,
            DealPatch {
                probability: Some(65),
                ..DealPatch::default()
            },
            t,
        )
        .await
        .unwrap();
    assert_eq!(tweaked.probability, 65);

    crm.deals.delete_deal(small.id).await.unwrap();
    let err = crm.deals.delete_deal(small.id).await.unwrap_err();
    assert!(matches!(err, CrmError::NotFound(_)));

    let summary = crm.deals.summary(now()).await.unwrap();
    assert_eq!(summary.active_deals_count, 0);
    assert_eq!(summary.total_pipeline_value, 0.0);
    assert_eq!(summary.win_rate, 100);
}

#[tokio::test]
async fn losses_reached_by_direct_update_count_against_win_rate() {
    let crm = CrmState::in_memory();

    for (name, value) in [("Won deal", 8_000.0), ("Lost deal", 2_000.0)] {
        crm.deals
            .create_deal(
                CreateDealRequest {
                    name: name.to_string(),
                    company: "Globex".to_string(),
                    contact_id: 1,
                    contact_name: "Bob Stone".to_string(),
                    value,
                    stage: None,
                    expected_close_date: Some(now()),
                    notes: None,
                },
                now(),
            )
            .await
            .unwrap();
    }

    let deals = crm.deals.list_deals().await.unwrap();
    let won_id = deals.iter().find(|d| d.name == "Won deal").unwrap().id;
    let lost_id = deals.iter().find(|d| d.name == "Lost deal").unwrap().id;

    crm.deals
        .move_stage(won_id, DealStage::ClosedWon, now())
        .await
        .unwrap();

    // The board cannot lose a deal; only a direct update can.
    let err = crm
        .deals
        .move_stage(lost_id, DealStage::ClosedLost, now())
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::InvalidStage(_)));

    crm.deals
        .update_deal(lost_id, DealPatch::stage(DealStage::ClosedLost), now())
        .await
        .unwrap();

    let summary = crm.deals.summary(now()).await.unwrap();
    assert_eq!(summary.win_rate, 50);
    assert_eq!(summary.monthly_closed_deals_count, 1);
    assert_eq!(summary.monthly_closed_deals_value, 8_000.0);
    assert_eq!(summary.active_deals_count, 0);
}
