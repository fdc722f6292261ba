//! Tests for the companies service

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::contacts::{ContactsService, CreateContactRequest};
use crate::deals::{CreateDealRequest, DealService};
use crate::store::MemoryStore;
use crate::tests::test_util;
use crate::{assert_err, assert_ok};

struct Fixture {
    companies: CompaniesService,
    contacts: ContactsService,
    deals: DealService,
}

fn fixture() -> Fixture {
    test_util::setup();
    let company_store = Arc::new(MemoryStore::<Company>::new());
    let contact_store = Arc::new(MemoryStore::<Contact>::new());
    let deal_store = Arc::new(MemoryStore::<Deal>::new());

    Fixture {
        companies: CompaniesService::new(
            company_store,
            contact_store.clone(),
            deal_store.clone(),
        ),
        contacts: ContactsService::new(contact_store),
        deals: DealService::new(deal_store),
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn base_request() -> CreateCompanyRequest {
    CreateCompanyRequest {
        name: "Acme Corp".to_string(),
        industry: "Manufacturing".to_string(),
        website: Some("https://acme.test".to_string()),
        description: None,
    }
}

#[tokio::test]
async fn create_requires_name_and_industry() {
    let f = fixture();

    let err = assert_err!(
        f.companies
            .create_company(
                CreateCompanyRequest {
                    industry: String::new(),
                    ..base_request()
                },
                now(),
            )
            .await
    );
    assert!(matches!(err, CrmError::Validation(_)));
}

#[tokio::test]
async fn fresh_company_has_empty_rollups() {
    let f = fixture();

    let company = assert_ok!(f.companies.create_company(base_request(), now()).await);

    assert_eq!(company.contact_count, 0);
    assert_eq!(company.total_deal_value, 0.0);
}

#[tokio::test]
async fn rollups_match_by_company_name() {
    let f = fixture();
    let company = assert_ok!(f.companies.create_company(base_request(), now()).await);

    assert_ok!(
        f.contacts
            .create_contact(
                CreateContactRequest {
                    name: "Jane Cooper".to_string(),
                    email: "jane@acme.test".to_string(),
                    phone: None,
                    company: Some("Acme Corp".to_string()),
                    position: None,
                    tags: None,
                    notes: None,
                },
                now(),
            )
            .await
    );
    assert_ok!(
        f.contacts
            .create_contact(
                CreateContactRequest {
                    name: "Bob Stone".to_string(),
                    email: "bob@globex.test".to_string(),
                    phone: None,
                    company: Some("Globex".to_string()),
                    position: None,
                    tags: None,
                    notes: None,
                },
                now(),
            )
            .await
    );
    assert_ok!(
        f.deals
            .create_deal(
                CreateDealRequest {
                    name: "Website redesign".to_string(),
                    company: "Acme Corp".to_string(),
                    contact_id: 1,
                    contact_name: "Jane Cooper".to_string(),
                    value: 12_000.0,
                    stage: None,
                    expected_close_date: None,
                    notes: None,
                },
                now(),
            )
            .await
    );
    assert_ok!(
        f.deals
            .create_deal(
                CreateDealRequest {
                    name: "Renewal".to_string(),
                    company: "Globex".to_string(),
                    contact_id: 2,
                    contact_name: "Bob Stone".to_string(),
                    value: 5_000.0,
                    stage: None,
                    expected_close_date: None,
                    notes: None,
                },
                now(),
            )
            .await
    );

    let overview = assert_ok!(f.companies.get_company(company.id).await);
    assert_eq!(overview.contact_count, 1);
    assert_eq!(overview.total_deal_value, 12_000.0);

    let all = assert_ok!(f.companies.list_companies().await);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].contact_count, 1);
}

#[tokio::test]
async fn update_replaces_editable_fields_wholesale() {
    let f = fixture();
    let company = assert_ok!(f.companies.create_company(base_request(), now()).await);

    let updated = assert_ok!(
        f.companies
            .update_company(
                company.id,
                UpdateCompanyRequest {
                    name: "Acme Corp".to_string(),
                    industry: "Robotics".to_string(),
                    website: None,
                    description: None,
                },
            )
            .await
    );

    assert_eq!(updated.industry, "Robotics");
    // Omitted optional fields reset rather than merge.
    assert_eq!(updated.website, "");
    assert_eq!(updated.created_at, now());
}

#[tokio::test]
async fn renaming_changes_what_the_rollups_match() {
    let f = fixture();
    let company = assert_ok!(f.companies.create_company(base_request(), now()).await);

    assert_ok!(
        f.deals
            .create_deal(
                CreateDealRequest {
                    name: "Website redesign".to_string(),
                    company: "Acme Corp".to_string(),
                    contact_id: 1,
                    contact_name: "Jane Cooper".to_string(),
                    value: 12_000.0,
                    stage: None,
                    expected_close_date: None,
                    notes: None,
                },
                now(),
            )
            .await
    );

    let renamed = assert_ok!(
        f.companies
            .update_company(
                company.id,
                UpdateCompanyRequest {
                    name: "Acme Industries".to_string(),
                    industry: "Manufacturing".to_string(),
                    website: None,
                    description: None,
                },
            )
            .await
    );

    // The deal still names "Acme Corp"; nothing re-links it.
    assert_eq!(renamed.total_deal_value, 0.0);
}

#[tokio::test]
async fn delete_twice_surfaces_not_found() {
    let f = fixture();
    let company = assert_ok!(f.companies.create_company(base_request(), now()).await);

    assert_ok!(f.companies.delete_company(company.id).await);
    let err = assert_err!(f.companies.delete_company(company.id).await);
    assert!(matches!(err, CrmError::NotFound(_)));
}
