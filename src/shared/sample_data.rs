//! Built-in demo dataset, the in-memory stand-in for the JSON fixtures the
//! UI ships with.

use crate::activities::Activity;
use crate::companies::Company;
use crate::contacts::Contact;
use crate::deals::Deal;
use crate::shared::error::CrmError;
use crate::shared::state::CrmState;

const CONTACTS_JSON: &str = r#"[
  {
    "id": 1,
    "name": "Jane Cooper",
    "email": "jane.cooper@acme.test",
    "phone": "555-0101",
    "company": "Acme Corp",
    "position": "VP Sales",
    "tags": ["decision-maker"],
    "notes": "Prefers email over calls.",
    "created_at": "2024-04-02T09:15:00Z",
    "last_activity": "2024-06-10T14:30:00Z"
  },
  {
    "id": 2,
    "name": "Bob Stone",
    "email": "bob.stone@globex.test",
    "phone": "555-0102",
    "company": "Globex",
    "position": "CTO",
    "tags": ["technical"],
    "notes": "",
    "created_at": "2024-04-18T11:00:00Z",
    "last_activity": "2024-06-08T10:05:00Z"
  },
  {
    "id": 3,
    "name": "Maria Alvarez",
    "email": "maria.alvarez@initech.test",
    "phone": "555-0103",
    "company": "Initech",
    "position": "Procurement Lead",
    "tags": [],
    "notes": "Introduced at the spring trade fair.",
    "created_at": "2024-05-06T16:45:00Z",
    "last_activity": "2024-05-28T09:00:00Z"
  }
]"#;

const COMPANIES_JSON: &str = r#"[
  {
    "id": 1,
    "name": "Acme Corp",
    "industry": "Manufacturing",
    "website": "https://acme.test",
    "description": "Industrial equipment and tooling.",
    "created_at": "2024-03-30T08:00:00Z"
  },
  {
    "id": 2,
    "name": "Globex",
    "industry": "Technology",
    "website": "https://globex.test",
    "description": "",
    "created_at": "2024-04-15T08:00:00Z"
  },
  {
    "id": 3,
    "name": "Initech",
    "industry": "Finance",
    "website": "",
    "description": "Payment processing group.",
    "created_at": "2024-05-01T08:00:00Z"
  }
]"#;

const DEALS_JSON: &str = r#"[
  {
    "id": 1,
    "name": "Website redesign",
    "company": "Acme Corp",
    "contact_id": 1,
    "contact_name": "Jane Cooper",
    "value": 12000.0,
    "stage": "Proposal",
    "probability": 75,
    "expected_close_date": "2024-06-28T00:00:00Z",
    "created_at": "2024-05-02T10:00:00Z",
    "last_activity": "2024-06-10T14:30:00Z",
    "notes": "Waiting on legal review."
  },
  {
    "id": 2,
    "name": "Platform migration",
    "company": "Globex",
    "contact_id": 2,
    "contact_name": "Bob Stone",
    "value": 45000.0,
    "stage": "Qualified",
    "probability": 50,
    "expected_close_date": "2024-08-15T00:00:00Z",
    "created_at": "2024-05-20T13:20:00Z",
    "last_activity": "2024-06-08T10:05:00Z",
    "notes": ""
  },
  {
    "id": 3,
    "name": "Annual support renewal",
    "company": "Acme Corp",
    "contact_id": 1,
    "contact_name": "Jane Cooper",
    "value": 8000.0,
    "stage": "Closed Won",
    "probability": 100,
    "expected_close_date": "2024-06-05T00:00:00Z",
    "created_at": "2024-04-10T09:00:00Z",
    "last_activity": "2024-06-05T17:00:00Z",
    "notes": ""
  },
  {
    "id": 4,
    "name": "Pilot program",
    "company": "Initech",
    "contact_id": 3,
    "contact_name": "Maria Alvarez",
    "value": 5500.0,
    "stage": "Lead",
    "probability": 25,
    "expected_close_date": "2024-07-20T00:00:00Z",
    "created_at": "2024-05-30T15:10:00Z",
    "last_activity": "2024-05-30T15:10:00Z",
    "notes": "Needs a security questionnaire first."
  },
  {
    "id": 5,
    "name": "Hardware bundle",
    "company": "Globex",
    "contact_id": 2,
    "contact_name": "Bob Stone",
    "value": 15000.0,
    "stage": "Closed Lost",
    "probability": 25,
    "expected_close_date": "2024-05-25T00:00:00Z",
    "created_at": "2024-03-12T11:30:00Z",
    "last_activity": "2024-05-25T08:45:00Z",
    "notes": "Lost to an incumbent vendor."
  }
]"#;

const ACTIVITIES_JSON: &str = r#"[
  {
    "id": 1,
    "contact_id": 1,
    "activity_type": "Call",
    "description": "Discovery call, scoped the redesign.",
    "timestamp": "2024-06-10T14:30:00Z",
    "created_by": "Current User",
    "status": "completed"
  },
  {
    "id": 2,
    "contact_id": 2,
    "activity_type": "Email",
    "description": "Sent migration plan draft.",
    "timestamp": "2024-06-08T10:05:00Z",
    "created_by": "Current User",
    "status": "completed"
  },
  {
    "id": 3,
    "contact_id": 3,
    "activity_type": "Meeting",
    "description": "Intro meeting booked for pilot kickoff.",
    "timestamp": "2024-05-28T09:00:00Z",
    "created_by": "Current User",
    "status": "planned"
  }
]"#;

/// A [`CrmState`] preloaded with the demo dataset.
pub fn sample_state() -> Result<CrmState, CrmError> {
    let contacts: Vec<Contact> = parse("contacts", CONTACTS_JSON)?;
    let companies: Vec<Company> = parse("companies", COMPANIES_JSON)?;
    let activities: Vec<Activity> = parse("activities", ACTIVITIES_JSON)?;
    let deals: Vec<Deal> = parse("deals", DEALS_JSON)?;
    Ok(CrmState::seeded(contacts, companies, activities, deals))
}

fn parse<T: serde::de::DeserializeOwned>(kind: &str, json: &str) -> Result<Vec<T>, CrmError> {
    serde_json::from_str(json).map_err(|e| CrmError::Store(format!("sample {kind}: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::deals::DealStage;

    #[tokio::test]
    async fn sample_state_loads_and_aggregates() {
        let crm = sample_state().unwrap();

        let deals = crm.deals.list_deals().await.unwrap();
        assert_eq!(deals.len(), 5);

        let funnel = crm.deals.funnel().await.unwrap();
        assert_eq!(funnel.len(), 4);
        assert_eq!(funnel.iter().map(|s| s.count).sum::<i64>(), 4);

        let june = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let summary = crm.deals.summary(june).await.unwrap();
        assert_eq!(summary.active_deals_count, 3);
        assert_eq!(summary.total_pipeline_value, 62_500.0);
        assert_eq!(summary.monthly_closed_deals_count, 1);
        assert_eq!(summary.monthly_closed_deals_value, 8_000.0);
        // One won, one lost.
        assert_eq!(summary.win_rate, 50);

        // Fresh inserts continue after the highest seeded id.
        let lost = crm.deals.get_deal(5).await.unwrap();
        assert_eq!(lost.stage, DealStage::ClosedLost);

        let overviews = crm.companies.list_companies().await.unwrap();
        let acme = overviews.iter().find(|c| c.name == "Acme Corp").unwrap();
        assert_eq!(acme.contact_count, 1);
        assert_eq!(acme.total_deal_value, 20_000.0);
    }
}
