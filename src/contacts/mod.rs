use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::shared::error::CrmError;
use crate::store::{Record, RecordId, RecordStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub position: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Record for Contact {
    const KIND: &'static str = "contact";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Field-by-field patch for a contact. Absent fields keep their value.
///
/// Contact edits do not bump `last_activity`; only the deal path refreshes
/// it, so a patch may set it explicitly when an activity is logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

pub struct ContactsService {
    store: Arc<dyn RecordStore<Contact>>,
}

impl ContactsService {
    pub fn new(store: Arc<dyn RecordStore<Contact>>) -> Self {
        Self { store }
    }

    pub async fn create_contact(
        &self,
        req: CreateContactRequest,
        now: DateTime<Utc>,
    ) -> Result<Contact, CrmError> {
        if req.name.trim().is_empty() || req.email.trim().is_empty() {
            return Err(CrmError::Validation(
                "contact name and email are required".to_string(),
            ));
        }

        let contact = Contact {
            id: 0,
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone.unwrap_or_default(),
            company: req.company.unwrap_or_default(),
            position: req.position.unwrap_or_default(),
            tags: req.tags.unwrap_or_default(),
            notes: req.notes.unwrap_or_default(),
            created_at: now,
            last_activity: now,
        };

        let contact = self.store.insert(contact).await?;
        info!("Created contact {} ({})", contact.id, contact.name);
        Ok(contact)
    }

    pub async fn update_contact(
        &self,
        id: RecordId,
        patch: ContactPatch,
    ) -> Result<Contact, CrmError> {
        let mut contact = self.store.get(id).await?;

        if let Some(name) = patch.name {
            contact.name = name;
        }
        if let Some(email) = patch.email {
            contact.email = email;
        }
        if let Some(phone) = patch.phone {
            contact.phone = phone;
        }
        if let Some(company) = patch.company {
            contact.company = company;
        }
        if let Some(position) = patch.position {
            contact.position = position;
        }
        if let Some(tags) = patch.tags {
            contact.tags = tags;
        }
        if let Some(notes) = patch.notes {
            contact.notes = notes;
        }
        if let Some(last_activity) = patch.last_activity {
            contact.last_activity = last_activity;
        }

        self.store.update(id, contact).await
    }

    pub async fn delete_contact(&self, id: RecordId) -> Result<(), CrmError> {
        self.store.delete(id).await?;
        info!("Deleted contact {id}");
        Ok(())
    }

    pub async fn get_contact(&self, id: RecordId) -> Result<Contact, CrmError> {
        self.store.get(id).await
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, CrmError> {
        self.store.list().await
    }

    /// Case-insensitive substring search over name, email, and company.
    pub async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>, CrmError> {
        let needle = query.to_lowercase();
        let contacts = self.store.list().await?;
        Ok(contacts
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.email.to_lowercase().contains(&needle)
                    || c.company.to_lowercase().contains(&needle)
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "contacts.test.rs"]
mod tests;
