use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::listing::JobFilter;

#[derive(Debug, Clone, FromRow)]
pub struct SavedSearch {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub sport: Option<String>,
    pub language: Option<String>,
    pub frequency: String,
    pub active: bool,
    pub last_notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Never,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Never => "never",
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        match self {
            Frequency::Daily => Some(Duration::days(1)),
            Frequency::Weekly => Some(Duration::weeks(1)),
            Frequency::Never => None,
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "never" => Ok(Frequency::Never),
            other => Err(format!("unknown frequency: {}", other)),
        }
    }
}

impl SavedSearch {
    pub fn criteria(&self) -> JobFilter {
        JobFilter {
            keyword: self.keyword.clone(),
            location: self.location.clone(),
            country: self.country.clone(),
            category: self.category.clone(),
            sport: self.sport.clone(),
            language: self.language.clone(),
        }
    }

    /// A digest is due once the frequency interval has elapsed since the last
    /// one, or since the search was created if none was sent yet.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        let Ok(frequency) = self.frequency.parse::<Frequency>() else {
            return false;
        };
        let Some(interval) = frequency.interval() else {
            return false;
        };
        let since = self.last_notified_at.unwrap_or(self.created_at);
        now.signed_duration_since(since) >= interval
    }
}
