use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::shared::error::CrmError;
use crate::store::{Record, RecordId, RecordStore};

/// Kind of touchpoint logged against a contact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Email,
    Call,
    Meeting,
    Note,
    Task,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::Email,
        ActivityType::Call,
        ActivityType::Meeting,
        ActivityType::Note,
        ActivityType::Task,
    ];

    /// Human label shown in pickers and feeds.
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Call => "Phone Call",
            Self::Meeting => "Meeting",
            Self::Note => "Note",
            Self::Task => "Task",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "Email"),
            Self::Call => write!(f, "Call"),
            Self::Meeting => write!(f, "Meeting"),
            Self::Note => write!(f, "Note"),
            Self::Task => write!(f, "Task"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: RecordId,
    pub contact_id: RecordId,
    pub activity_type: ActivityType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub created_by: String,
    pub status: String,
}

impl Record for Activity {
    const KIND: &'static str = "activity";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityRequest {
    pub contact_id: RecordId,
    pub activity_type: ActivityType,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub status: Option<String>,
}

/// Field-by-field patch for an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityPatch {
    pub contact_id: Option<RecordId>,
    pub activity_type: Option<ActivityType>,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub status: Option<String>,
}

pub struct ActivitiesService {
    store: Arc<dyn RecordStore<Activity>>,
}

impl ActivitiesService {
    pub fn new(store: Arc<dyn RecordStore<Activity>>) -> Self {
        Self { store }
    }

    pub async fn create_activity(
        &self,
        req: CreateActivityRequest,
        now: DateTime<Utc>,
    ) -> Result<Activity, CrmError> {
        if req.contact_id <= 0 {
            return Err(CrmError::Validation(
                "valid contact id is required".to_string(),
            ));
        }
        if req.description.trim().is_empty() {
            return Err(CrmError::Validation(
                "activity description is required".to_string(),
            ));
        }

        let activity = Activity {
            id: 0,
            contact_id: req.contact_id,
            activity_type: req.activity_type,
            description: req.description.trim().to_string(),
            timestamp: req.timestamp.unwrap_or(now),
            created_by: req.created_by.unwrap_or_else(|| "Current User".to_string()),
            status: req.status.unwrap_or_else(|| "completed".to_string()),
        };

        let activity = self.store.insert(activity).await?;
        info!(
            "Logged {} activity {} for contact {}",
            activity.activity_type, activity.id, activity.contact_id
        );
        Ok(activity)
    }

    pub async fn update_activity(
        &self,
        id: RecordId,
        patch: ActivityPatch,
    ) -> Result<Activity, CrmError> {
        let mut activity = self.store.get(id).await?;

        if let Some(description) = patch.description {
            if description.trim().is_empty() {
                return Err(CrmError::Validation(
                    "activity description cannot be empty".to_string(),
                ));
            }
            activity.description = description.trim().to_string();
        }
        if let Some(contact_id) = patch.contact_id {
            activity.contact_id = contact_id;
        }
        if let Some(activity_type) = patch.activity_type {
            activity.activity_type = activity_type;
        }
        if let Some(timestamp) = patch.timestamp {
            activity.timestamp = timestamp;
        }
        if let Some(created_by) = patch.created_by {
            activity.created_by = created_by;
        }
        if let Some(status) = patch.status {
            activity.status = status;
        }

        self.store.update(id, activity).await
    }

    /// Remove an activity, returning the removed record.
    pub async fn delete_activity(&self, id: RecordId) -> Result<Activity, CrmError> {
        let activity = self.store.get(id).await?;
        self.store.delete(id).await?;
        info!("Deleted activity {id}");
        Ok(activity)
    }

    pub async fn get_activity(&self, id: RecordId) -> Result<Activity, CrmError> {
        self.store.get(id).await
    }

    /// All activities, newest first.
    pub async fn list_activities(&self) -> Result<Vec<Activity>, CrmError> {
        let mut activities = self.store.list().await?;
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(activities)
    }

    /// A contact's activity feed, newest first.
    pub async fn activities_for_contact(
        &self,
        contact_id: RecordId,
    ) -> Result<Vec<Activity>, CrmError> {
        if contact_id <= 0 {
            return Err(CrmError::Validation(
                "valid contact id is required".to_string(),
            ));
        }
        let mut activities = self.store.list().await?;
        activities.retain(|a| a.contact_id == contact_id);
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(activities)
    }
}

#[cfg(test)]
#[path = "activities.test.rs"]
mod tests;
