//! Tests for the contacts service

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::*;
use crate::store::MemoryStore;
use crate::tests::test_util;
use crate::{assert_err, assert_ok};

fn service() -> ContactsService {
    test_util::setup();
    ContactsService::new(Arc::new(MemoryStore::<Contact>::new()))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn base_request() -> CreateContactRequest {
    CreateContactRequest {
        name: "Jane Cooper".to_string(),
        email: "jane@acme.test".to_string(),
        phone: Some("555-0101".to_string()),
        company: Some("Acme Corp".to_string()),
        position: Some("VP Sales".to_string()),
        tags: None,
        notes: None,
    }
}

#[tokio::test]
async fn create_stamps_timestamps_and_defaults() {
    let service = service();

    let contact = assert_ok!(service.create_contact(base_request(), now()).await);

    assert_eq!(contact.id, 1);
    assert_eq!(contact.created_at, now());
    assert_eq!(contact.last_activity, now());
    assert!(contact.tags.is_empty());
    assert!(contact.notes.is_empty());
}

#[tokio::test]
async fn create_requires_name_and_email() {
    let service = service();

    let err = assert_err!(
        service
            .create_contact(
                CreateContactRequest {
                    name: String::new(),
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));

    let err = assert_err!(
        service
            .create_contact(
                CreateContactRequest {
                    email: "  ".to_string(),
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));
}

#[tokio::test]
async fn update_merges_without_touching_last_activity() {
    let service = service();
    let contact = assert_ok!(service.create_contact(base_request(), now()).await);

    let updated = assert_ok!(
        service
            .update_contact(
                contact.id,
                ContactPatch {
                    position: Some("CRO".to_string()),
                    ..ContactPatch::default()
                },
            )
            .await
    );

    assert_eq!(updated.position, "CRO");
    assert_eq!(updated.name, "Jane Cooper");
    assert_eq!(updated.last_activity, now());
}

#[tokio::test]
async fn patch_can_set_last_activity_explicitly() {
    let service = service();
    let contact = assert_ok!(service.create_contact(base_request(), now()).await);

    let later = now() + Duration::days(1);
    let updated = assert_ok!(
        service
            .update_contact(
                contact.id,
                ContactPatch {
                    last_activity: Some(later),
                    ..ContactPatch::default()
                },
            )
            .await
    );

    assert_eq!(updated.last_activity, later);
}

#[tokio::test]
async fn search_is_case_insensitive_across_fields() {
    let service = service();
    assert_ok!(service.create_contact(base_request(), now()).await);
    assert_ok!(
        service
            .create_contact(
                CreateContactRequest {
                    name: "Bob Stone".to_string(),
                    email: "bob@globex.test".to_string(),
                    company: Some("Globex".to_string()),
                    ..base_request()
                },
                now(),
            )
            .await
    );

    let by_name = assert_ok!(service.search_contacts("jane").await);
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Jane Cooper");

    let by_company = assert_ok!(service.search_contacts("GLOBEX").await);
    assert_eq!(by_company.len(), 1);
    assert_eq!(by_company[0].name, "Bob Stone");

    let by_email_domain = assert_ok!(service.search_contacts("acme.test").await);
    assert_eq!(by_email_domain.len(), 1);

    assert!(assert_ok!(service.search_contacts("nobody").await).is_empty());
}

#[tokio::test]
async fn delete_twice_surfaces_not_found() {
    let service = service();
    let contact = assert_ok!(service.create_contact(base_request(), now()).await);

    assert_ok!(service.delete_contact(contact.id).await);
    let err = assert_err!(service.delete_contact(contact.id).await);
    assert!(matches!(err, CrmError::NotFound(_)));
}
