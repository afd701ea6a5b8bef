use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::saved_search_dto::{CreateSavedSearchPayload, UpdateSavedSearchPayload};
use crate::error::{Error, Result};
use crate::listing::JobFilter;
use crate::models::saved_search::{Frequency, SavedSearch};
use crate::vocabulary::{select, LANGUAGES, OCCUPATIONAL_AREAS, SPORTS};

const SAVED_SEARCH_COLUMNS: &str = "id, owner_id, name, keyword, location, country, category, \
     sport, language, frequency, active, last_notified_at, created_at, updated_at";

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn single(options: &[&str], value: Option<String>) -> Result<Option<String>> {
    match trimmed(value) {
        Some(v) => Ok(select(options, Some(1), &[v])?.into_iter().next()),
        None => Ok(None),
    }
}

/// Blank criteria are dropped; vocabulary criteria are canonicalized the
/// same way the job fields they match against are.
pub fn normalize_criteria(criteria: JobFilter) -> Result<JobFilter> {
    Ok(JobFilter {
        keyword: trimmed(criteria.keyword),
        location: trimmed(criteria.location),
        country: trimmed(criteria.country).map(|c| c.to_uppercase()),
        category: single(OCCUPATIONAL_AREAS, criteria.category)?,
        sport: single(SPORTS, criteria.sport)?,
        language: single(LANGUAGES, criteria.language)?,
    })
}

#[derive(Clone)]
pub struct SavedSearchService {
    pool: PgPool,
}

impl SavedSearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<SavedSearch>> {
        let sql = format!(
            "SELECT {} FROM saved_searches WHERE owner_id = $1 ORDER BY created_at DESC",
            SAVED_SEARCH_COLUMNS
        );
        Ok(sqlx::query_as::<_, SavedSearch>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<SavedSearch> {
        let sql = format!(
            "SELECT {} FROM saved_searches WHERE id = $1 AND owner_id = $2",
            SAVED_SEARCH_COLUMNS
        );
        sqlx::query_as::<_, SavedSearch>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("saved_search_not_found".into()))
    }

    pub async fn create(&self, owner_id: Uuid, payload: CreateSavedSearchPayload) -> Result<SavedSearch> {
        let criteria = normalize_criteria(payload.criteria)?;
        let frequency = payload.frequency.unwrap_or(Frequency::Weekly);
        let sql = format!(
            r#"
            INSERT INTO saved_searches (
                owner_id, name, keyword, location, country, category, sport, language,
                frequency, active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SAVED_SEARCH_COLUMNS
        );
        Ok(sqlx::query_as::<_, SavedSearch>(&sql)
            .bind(owner_id)
            .bind(payload.name.trim())
            .bind(&criteria.keyword)
            .bind(&criteria.location)
            .bind(&criteria.country)
            .bind(&criteria.category)
            .bind(&criteria.sport)
            .bind(&criteria.language)
            .bind(frequency.as_str())
            .bind(payload.active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn update(&self, owner_id: Uuid, id: Uuid, payload: UpdateSavedSearchPayload) -> Result<SavedSearch> {
        let existing = self.get(owner_id, id).await?;
        let criteria = match payload.criteria {
            Some(criteria) => normalize_criteria(criteria)?,
            None => existing.criteria(),
        };
        let sql = format!(
            r#"
            UPDATE saved_searches
            SET name = $2, keyword = $3, location = $4, country = $5, category = $6,
                sport = $7, language = $8, frequency = $9, active = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SAVED_SEARCH_COLUMNS
        );
        Ok(sqlx::query_as::<_, SavedSearch>(&sql)
            .bind(id)
            .bind(
                payload
                    .name
                    .map(|n| n.trim().to_string())
                    .unwrap_or(existing.name),
            )
            .bind(&criteria.keyword)
            .bind(&criteria.location)
            .bind(&criteria.country)
            .bind(&criteria.category)
            .bind(&criteria.sport)
            .bind(&criteria.language)
            .bind(
                payload
                    .frequency
                    .map(|f| f.as_str().to_string())
                    .unwrap_or(existing.frequency),
            )
            .bind(payload.active.unwrap_or(existing.active))
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("saved_search_not_found".into()));
        }
        Ok(())
    }

    /// Active searches whose digest interval has elapsed at `now`.
    pub async fn due(&self, now: DateTime<Utc>) -> Result<Vec<SavedSearch>> {
        let sql = format!(
            "SELECT {} FROM saved_searches WHERE active AND frequency <> 'never'",
            SAVED_SEARCH_COLUMNS
        );
        let searches = sqlx::query_as::<_, SavedSearch>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(searches.into_iter().filter(|s| s.is_due(now)).collect())
    }

    pub async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE saved_searches SET last_notified_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_are_trimmed_and_canonicalized() {
        let criteria = normalize_criteria(JobFilter {
            keyword: Some("  kite ".into()),
            location: Some("   ".into()),
            country: Some("es".into()),
            category: Some("instruction".into()),
            sport: Some("KITESURFING".into()),
            language: None,
        })
        .unwrap();
        assert_eq!(criteria.keyword.as_deref(), Some("kite"));
        assert_eq!(criteria.location, None);
        assert_eq!(criteria.country.as_deref(), Some("ES"));
        assert_eq!(criteria.category.as_deref(), Some("Instruction"));
        assert_eq!(criteria.sport.as_deref(), Some("Kitesurfing"));
    }

    #[test]
    fn unknown_sport_is_rejected() {
        let result = normalize_criteria(JobFilter {
            sport: Some("Curling".into()),
            ..JobFilter::default()
        });
        assert!(matches!(result, Err(Error::Selection(_))));
    }
}
