use std::sync::Arc;

use crate::activities::{ActivitiesService, Activity};
use crate::companies::{CompaniesService, Company};
use crate::contacts::{Contact, ContactsService};
use crate::deals::{Deal, DealService};
use crate::store::MemoryStore;

/// All four services wired over shared stores. The companies service reads
/// the contact and deal stores for its rollups, so the stores are shared,
/// not per-service.
pub struct CrmState {
    pub contacts: ContactsService,
    pub companies: CompaniesService,
    pub activities: ActivitiesService,
    pub deals: DealService,
}

impl CrmState {
    /// Empty in-memory wiring, the only backend this crate ships.
    pub fn in_memory() -> Self {
        Self::seeded(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    /// In-memory wiring over existing records, e.g. the built-in sample
    /// dataset or a test fixture.
    pub fn seeded(
        contacts: Vec<Contact>,
        companies: Vec<Company>,
        activities: Vec<Activity>,
        deals: Vec<Deal>,
    ) -> Self {
        let contact_store = Arc::new(MemoryStore::seeded(contacts));
        let company_store = Arc::new(MemoryStore::seeded(companies));
        let activity_store = Arc::new(MemoryStore::seeded(activities));
        let deal_store = Arc::new(MemoryStore::seeded(deals));

        Self {
            contacts: ContactsService::new(contact_store.clone()),
            companies: CompaniesService::new(
                company_store,
                contact_store,
                deal_store.clone(),
            ),
            activities: ActivitiesService::new(activity_store),
            deals: DealService::new(deal_store),
        }
    }
}
