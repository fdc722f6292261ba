//! Tests for the activities service

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::*;
use crate::store::MemoryStore;
use crate::tests::test_util;
use crate::{assert_err, assert_ok};

fn service() -> ActivitiesService {
    test_util::setup();
    ActivitiesService::new(Arc::new(MemoryStore::<Activity>::new()))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn base_request() -> CreateActivityRequest {
    CreateActivityRequest {
        contact_id: 1,
        activity_type: ActivityType::Call,
        description: "Discovery call".to_string(),
        timestamp: None,
        created_by: None,
        status: None,
    }
}

#[tokio::test]
async fn create_fills_defaults() {
    let service = service();

    let activity = assert_ok!(service.create_activity(base_request(), now()).await);

    assert_eq!(activity.timestamp, now());
    assert_eq!(activity.created_by, "Current User");
    assert_eq!(activity.status, "completed");
}

#[tokio::test]
async fn create_validates_contact_and_description() {
    let service = service();

    let err = assert_err!(
        service
            .create_activity(
                CreateActivityRequest {
                    contact_id: 0,
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));

    let err = assert_err!(
        service
            .create_activity(
                CreateActivityRequest {
                    description: "   ".to_string(),
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));
}

#[tokio::test]
async fn create_trims_description() {
    let service = service();

    let activity = assert_ok!(
        service
            .create_activity(
                CreateActivityRequest {
                    description: "  Sent proposal  ".to_string(),
                    ..base_request()
                },
                now(),
            )
            .await
    );

    assert_eq!(activity.description, "Sent proposal");
}

#[tokio::test]
async fn update_rejects_explicit_empty_description() {
    let service = service();
    let activity = assert_ok!(service.create_activity(base_request(), now()).await);

    let err = assert_err!(
        service
            .update_activity(
                activity.id,
                ActivityPatch {
                    description: Some("  ".to_string()),
                    ..ActivityPatch::default()
                },
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));

    // An absent description leaves the stored one alone.
    let updated = assert_ok!(
        service
            .update_activity(
                activity.id,
                ActivityPatch {
                    status: Some("planned".to_string()),
                    ..ActivityPatch::default()
                },
            )
            .await
    );
    assert_eq!(updated.description, "Discovery call");
    assert_eq!(updated.status, "planned");
}

#[tokio::test]
async fn feeds_are_newest_first() {
    let service = service();

    assert_ok!(
        service
            .create_activity(
                CreateActivityRequest {
                    description: "oldest".to_string(),
                    timestamp: Some(now() - Duration::days(2)),
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert_ok!(
        service
            .create_activity(
                CreateActivityRequest {
                    description: "newest".to_string(),
                    timestamp: Some(now()),
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert_ok!(
        service
            .create_activity(
                CreateActivityRequest {
                    description: "middle".to_string(),
                    timestamp: Some(now() - Duration::days(1)),
                    contact_id: 2,
                    ..base_request()
                },
                now(),
            )
            .await
    );

    let all = assert_ok!(service.list_activities().await);
    let order: Vec<_> = all.iter().map(|a| a.description.as_str()).collect();
    assert_eq!(order, ["newest", "middle", "oldest"]);

    let feed = assert_ok!(service.activities_for_contact(1).await);
    let order: Vec<_> = feed.iter().map(|a| a.description.as_str()).collect();
    assert_eq!(order, ["newest", "oldest"]);
}

#[tokio::test]
async fn contact_feed_validates_id() {
    let service = service();

    let err = assert_err!(service.activities_for_contact(0).await);
    assert!(matches!(err, CrmError::Validation(_)));
}

#[tokio::test]
async fn delete_returns_the_removed_record() {
    let service = service();
    let activity = assert_ok!(service.create_activity(base_request(), now()).await);

    let removed = assert_ok!(service.delete_activity(activity.id).await);
    assert_eq!(removed.id, activity.id);
    assert_eq!(removed.description, "Discovery call");

    let err = assert_err!(service.delete_activity(activity.id).await);
    assert!(matches!(err, CrmError::NotFound(_)));
}

#[test]
fn activity_type_labels() {
    assert_eq!(ActivityType::ALL.len(), 5);
    assert_eq!(ActivityType::Call.label(), "Phone Call");
    assert_eq!(ActivityType::Call.to_string(), "Call");
}
