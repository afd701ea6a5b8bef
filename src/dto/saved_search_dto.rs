use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::listing::JobFilter;
use crate::models::saved_search::{Frequency, SavedSearch};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavedSearchPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub criteria: JobFilter,
    pub frequency: Option<Frequency>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSavedSearchPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub criteria: Option<JobFilter>,
    pub frequency: Option<Frequency>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchResponse {
    pub id: Uuid,
    pub name: String,
    pub criteria: JobFilter,
    pub frequency: String,
    pub active: bool,
    pub last_notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SavedSearch> for SavedSearchResponse {
    fn from(value: SavedSearch) -> Self {
        Self {
            criteria: value.criteria(),
            id: value.id,
            name: value.name,
            frequency: value.frequency,
            active: value.active,
            last_notified_at: value.last_notified_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchesQuery {
    pub page: Option<usize>,
}
