use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::shared::error::CrmError;
use crate::store::{Record, RecordId, RecordStore};

pub mod analytics;
pub mod stage;

pub use analytics::{compute_funnel, compute_summary, PipelineSummary, StageStats};
pub use stage::{DealStage, CANONICAL_STAGES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: RecordId,
    pub name: String,
    pub company: String,
    /// Reference to a contact, not ownership. Never checked against the
    /// contact store; a deal whose contact is gone stays valid.
    pub contact_id: RecordId,
    /// Denormalized display snapshot, never re-synced with the contact.
    pub contact_name: String,
    pub value: f64,
    pub stage: DealStage,
    pub probability: i32,
    pub expected_close_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub notes: String,
}

impl Record for Deal {
    const KIND: &'static str = "deal";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDealRequest {
    pub name: String,
    pub company: String,
    pub contact_id: RecordId,
    pub contact_name: String,
    pub value: f64,
    pub stage: Option<DealStage>,
    pub expected_close_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Field-by-field patch for a deal. Absent fields keep their current value;
/// `id` and `created_at` can never change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub contact_id: Option<RecordId>,
    pub contact_name: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<DealStage>,
    pub probability: Option<i32>,
    pub expected_close_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl DealPatch {
    /// Patch that only moves the deal to `stage`.
    pub fn stage(stage: DealStage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }
}

/// The pipeline engine: deal mutations with derived fields, plus analytics
/// computed on demand from a store snapshot.
pub struct DealService {
    store: Arc<dyn RecordStore<Deal>>,
}

impl DealService {
    pub fn new(store: Arc<dyn RecordStore<Deal>>) -> Self {
        Self { store }
    }

    /// Create a deal. Stage defaults to `Lead`, probability is always
    /// derived from the stage, and the close date falls back to thirty days
    /// out. Contact existence is the form layer's concern and is not
    /// re-checked here.
    pub async fn create_deal(
        &self,
        req: CreateDealRequest,
        now: DateTime<Utc>,
    ) -> Result<Deal, CrmError> {
        if req.name.trim().is_empty() || req.company.trim().is_empty() {
            return Err(CrmError::Validation(
                "deal name and company are required".to_string(),
            ));
        }
        if req.value <= 0.0 {
            return Err(CrmError::Validation(
                "deal value must be positive".to_string(),
            ));
        }

        let stage = req.stage.unwrap_or(DealStage::Lead);
        let deal = Deal {
            id: 0,
            name: req.name.trim().to_string(),
            company: req.company.trim().to_string(),
            contact_id: req.contact_id,
            contact_name: req.contact_name,
            value: req.value,
            stage,
            probability: stage.default_probability(),
            expected_close_date: req
                .expected_close_date
                .unwrap_or(now + Duration::days(30)),
            created_at: now,
            last_activity: now,
            notes: req.notes.unwrap_or_default(),
        };

        let deal = self.store.insert(deal).await?;
        info!("Created deal {} ({}) at stage {}", deal.id, deal.name, deal.stage);
        Ok(deal)
    }

    /// Merge `patch` over the stored deal and bump `last_activity`.
    ///
    /// A stage change resets the probability to the new stage's default
    /// unless the same patch carries an explicit probability, which is then
    /// stored verbatim. This is what makes dragging a card to another column
    /// reset its likelihood while a manual edit sticks.
    pub async fn update_deal(
        &self,
        id: RecordId,
        patch: DealPatch,
        now: DateTime<Utc>,
    ) -> Result<Deal, CrmError> {
        let mut deal = self.store.get(id).await?;

        if let Some(name) = patch.name {
            deal.name = name;
        }
        if let Some(company) = patch.company {
            deal.company = company;
        }
        if let Some(contact_id) = patch.contact_id {
            deal.contact_id = contact_id;
        }
        if let Some(contact_name) = patch.contact_name {
            deal.contact_name = contact_name;
        }
        if let Some(value) = patch.value {
            deal.value = value;
        }
        if let Some(expected_close_date) = patch.expected_close_date {
            deal.expected_close_date = expected_close_date;
        }
        if let Some(notes) = patch.notes {
            deal.notes = notes;
        }

        if let Some(new_stage) = patch.stage {
            if new_stage != deal.stage && patch.probability.is_none() {
                deal.probability = new_stage.default_probability();
            }
            deal.stage = new_stage;
        }
        if let Some(probability) = patch.probability {
            deal.probability = probability;
        }

        deal.last_activity = now;
        self.store.update(id, deal).await
    }

    /// Permanent removal. Deleting the same id again surfaces `NotFound`.
    pub async fn delete_deal(&self, id: RecordId) -> Result<(), CrmError> {
        self.store.delete(id).await?;
        info!("Deleted deal {id}");
        Ok(())
    }

    /// Board move. Only board columns are valid targets; `Closed Lost` is
    /// rejected here and reachable only through `update_deal`. Moving a
    /// card onto its current column still bumps `last_activity`.
    pub async fn move_stage(
        &self,
        id: RecordId,
        new_stage: DealStage,
        now: DateTime<Utc>,
    ) -> Result<Deal, CrmError> {
        if !new_stage.is_canonical() {
            return Err(CrmError::InvalidStage(new_stage.to_string()));
        }
        self.update_deal(id, DealPatch::stage(new_stage), now).await
    }

    pub async fn get_deal(&self, id: RecordId) -> Result<Deal, CrmError> {
        self.store.get(id).await
    }

    pub async fn list_deals(&self) -> Result<Vec<Deal>, CrmError> {
        self.store.list().await
    }

    pub async fn deals_by_stage(&self, stage: DealStage) -> Result<Vec<Deal>, CrmError> {
        let deals = self.store.list().await?;
        Ok(deals.into_iter().filter(|d| d.stage == stage).collect())
    }

    /// Per-stage funnel over the current snapshot.
    pub async fn funnel(&self) -> Result<Vec<StageStats>, CrmError> {
        let deals = self.store.list().await?;
        Ok(compute_funnel(&deals))
    }

    /// Pipeline rollup over the current snapshot.
    pub async fn summary(&self, now: DateTime<Utc>) -> Result<PipelineSummary, CrmError> {
        let deals = self.store.list().await?;
        Ok(compute_summary(&deals, now))
    }
}

#[cfg(test)]
#[path = "deals.test.rs"]
mod tests;
