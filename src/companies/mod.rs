use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::contacts::Contact;
use crate::deals::Deal;
use crate::shared::error::CrmError;
use crate::store::{Record, RecordId, RecordStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: RecordId,
    pub name: String,
    pub industry: String,
    pub website: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Company {
    const KIND: &'static str = "company";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// Company read model with rollups derived at read time. Contacts and deals
/// are matched by company name; there is no referential integrity, and a
/// rename simply stops matching older records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyOverview {
    pub id: RecordId,
    pub name: String,
    pub industry: String,
    pub website: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub contact_count: i64,
    pub total_deal_value: f64,
}

impl CompanyOverview {
    fn build(company: Company, contacts: &[Contact], deals: &[Deal]) -> Self {
        let contact_count = contacts
            .iter()
            .filter(|c| c.company == company.name)
            .count() as i64;
        let total_deal_value = deals
            .iter()
            .filter(|d| d.company == company.name)
            .map(|d| d.value)
            .sum();

        Self {
            id: company.id,
            name: company.name,
            industry: company.industry,
            website: company.website,
            description: company.description,
            created_at: company.created_at,
            contact_count,
            total_deal_value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub industry: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// Company edits replace all editable fields at once; optional fields reset
/// to empty when omitted. Unlike deals and contacts there is no per-field
/// merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: String,
    pub industry: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

pub struct CompaniesService {
    store: Arc<dyn RecordStore<Company>>,
    contacts: Arc<dyn RecordStore<Contact>>,
    deals: Arc<dyn RecordStore<Deal>>,
}

impl CompaniesService {
    pub fn new(
        store: Arc<dyn RecordStore<Company>>,
        contacts: Arc<dyn RecordStore<Contact>>,
        deals: Arc<dyn RecordStore<Deal>>,
    ) -> Self {
        Self {
            store,
            contacts,
            deals,
        }
    }

    pub async fn create_company(
        &self,
        req: CreateCompanyRequest,
        now: DateTime<Utc>,
    ) -> Result<CompanyOverview, CrmError> {
        if req.name.trim().is_empty() || req.industry.trim().is_empty() {
            return Err(CrmError::Validation(
                "company name and industry are required".to_string(),
            ));
        }

        let company = Company {
            id: 0,
            name: req.name.trim().to_string(),
            industry: req.industry.trim().to_string(),
            website: req.website.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            created_at: now,
        };

        let company = self.store.insert(company).await?;
        info!("Created company {} ({})", company.id, company.name);
        // A fresh company has no matching contacts or deals yet.
        Ok(CompanyOverview::build(company, &[], &[]))
    }

    pub async fn update_company(
        &self,
        id: RecordId,
        req: UpdateCompanyRequest,
    ) -> Result<CompanyOverview, CrmError> {
        let mut company = self.store.get(id).await?;

        company.name = req.name;
        company.industry = req.industry;
        company.website = req.website.unwrap_or_default();
        company.description = req.description.unwrap_or_default();

        let company = self.store.update(id, company).await?;
        self.overview(company).await
    }

    pub async fn delete_company(&self, id: RecordId) -> Result<(), CrmError> {
        self.store.delete(id).await?;
        info!("Deleted company {id}");
        Ok(())
    }

    pub async fn get_company(&self, id: RecordId) -> Result<CompanyOverview, CrmError> {
        let company = self.store.get(id).await?;
        self.overview(company).await
    }

    pub async fn list_companies(&self) -> Result<Vec<CompanyOverview>, CrmError> {
        let companies = self.store.list().await?;
        let contacts = self.contacts.list().await?;
        let deals = self.deals.list().await?;
        Ok(companies
            .into_iter()
            .map(|c| CompanyOverview::build(c, &contacts, &deals))
            .collect())
    }

    async fn overview(&self, company: Company) -> Result<CompanyOverview, CrmError> {
        let contacts = self.contacts.list().await?;
        let deals = self.deals.list().await?;
        Ok(CompanyOverview::build(company, &contacts, &deals))
    }
}

#[cfg(test)]
#[path = "companies.test.rs"]
mod tests;
