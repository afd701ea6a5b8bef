//! Saved-search digests.
//!
//! A cron job wakes up hourly, finds saved searches whose interval has
//! elapsed, and matches the jobs published since their last digest through
//! the same filter engine as the board. Delivery is not wired up yet; the
//! digest is logged and the run recorded.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::future::Future;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::listing::sort_featured_first;
use crate::models::job::Job;
use crate::models::saved_search::SavedSearch;
use crate::services::audit_service::{AuditEntry, AuditService};
use crate::services::job_service::JobService;
use crate::services::saved_search_service::SavedSearchService;

pub const DIGEST_SCHEDULE: &str = "0 0 * * * *";

/// Jobs created after the previous digest that match the saved criteria,
/// featured first.
pub fn digest_matches(search: &SavedSearch, jobs: &[Job]) -> Vec<Job> {
    let since = search.last_notified_at.unwrap_or(search.created_at);
    let criteria = search.criteria();
    let mut matches: Vec<Job> = jobs
        .iter()
        .filter(|job| job.created_at > since && criteria.matches(job))
        .cloned()
        .collect();
    sort_featured_first(&mut matches);
    matches
}

/// Stamps every id in turn. Failures are logged and do not stop the rest;
/// returns the ids that were stamped.
async fn stamp_each<F, Fut>(ids: impl IntoIterator<Item = Uuid>, mut stamp: F) -> Vec<Uuid>
where
    F: FnMut(Uuid) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut stamped = Vec::new();
    for id in ids {
        match stamp(id).await {
            Ok(()) => stamped.push(id),
            Err(e) => tracing::warn!(
                saved_search_id = %id,
                error = %e,
                "failed to stamp saved search digest, skipping"
            ),
        }
    }
    stamped
}

#[derive(Clone)]
pub struct DigestService {
    saved_searches: SavedSearchService,
    jobs: JobService,
    audit: AuditService,
}

impl DigestService {
    pub fn new(saved_searches: SavedSearchService, jobs: JobService, audit: AuditService) -> Self {
        Self {
            saved_searches,
            jobs,
            audit,
        }
    }

    /// Returns how many digests were produced. A search whose stamp fails is
    /// skipped and picked up again on a later tick.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.saved_searches.due(now).await?;
        if due.is_empty() {
            return Ok(0);
        }
        let oldest = due
            .iter()
            .map(|s| s.last_notified_at.unwrap_or(s.created_at))
            .min()
            .unwrap_or(now);
        let jobs = self.jobs.published_since(oldest).await?;

        let mut digests = Vec::with_capacity(due.len());
        for search in &due {
            let matches = digest_matches(search, &jobs);
            tracing::info!(
                saved_search_id = %search.id,
                owner_id = %search.owner_id,
                matches = matches.len(),
                "saved search digest ready"
            );
            digests.push((search.id, matches));
        }

        let saved_searches = &self.saved_searches;
        let stamped = stamp_each(digests.iter().map(|(id, _)| *id).collect::<Vec<Uuid>>(), move |id| {
            saved_searches.mark_notified(id, now)
        })
        .await;

        for (id, matches) in digests.iter().filter(|(id, _)| stamped.contains(id)) {
            self.audit
                .record(AuditEntry {
                    action: "saved_search.digest",
                    entity_type: "saved_search",
                    entity_id: *id,
                    metadata: Some(json!({
                        "matches": matches.len(),
                        "jobIds": matches.iter().map(|j| j.id).collect::<Vec<_>>(),
                    })),
                    ..AuditEntry::default()
                })
                .await;
        }
        Ok(stamped.len())
    }

    /// Starts the hourly digest job. Failed ticks are logged and the next
    /// tick runs as usual.
    pub async fn start(self) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| Error::Internal(format!("Failed to create scheduler: {}", e)))?;
        let job = CronJob::new_async(DIGEST_SCHEDULE, move |_id, _scheduler| {
            let service = self.clone();
            Box::pin(async move {
                match service.run_once(Utc::now()).await {
                    Ok(0) => tracing::debug!("no saved search digests due"),
                    Ok(count) => tracing::info!(count, "saved search digests processed"),
                    Err(e) => tracing::error!(error = %e, "saved search digest run failed"),
                }
            })
        })
        .map_err(|e| Error::Internal(format!("Invalid digest schedule: {}", e)))?;
        scheduler
            .add(job)
            .await
            .map_err(|e| Error::Internal(format!("Failed to add digest job: {}", e)))?;
        scheduler
            .start()
            .await
            .map_err(|e| Error::Internal(format!("Failed to start scheduler: {}", e)))?;
        tracing::info!(schedule = DIGEST_SCHEDULE, "saved search digest scheduled");
        Ok(scheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::filter::fixtures::{dated_job, job};
    use chrono::{Duration, TimeZone};
    use std::future::ready;

    fn kite_search(last_notified_at: Option<DateTime<Utc>>, created_at: DateTime<Utc>) -> SavedSearch {
        SavedSearch {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Kite in Spain".into(),
            keyword: None,
            location: None,
            country: Some("ES".into()),
            category: None,
            sport: Some("Kitesurfing".into()),
            language: None,
            frequency: "daily".into(),
            active: true,
            last_notified_at,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn only_new_matching_jobs_are_included() {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let search = kite_search(Some(base), base - Duration::days(30));

        let mut surf = job("Surf coach", "ES", &["Surfing"]);
        surf.created_at = base + Duration::hours(2);
        let jobs = vec![
            dated_job("Old kite job", false, base - Duration::hours(1)),
            dated_job("Kite instructor", false, base + Duration::hours(3)),
            dated_job("Kite coach", true, base + Duration::hours(1)),
            surf,
        ];

        let titles: Vec<_> = digest_matches(&search, &jobs)
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, vec!["Kite coach", "Kite instructor"]);
    }

    #[test]
    fn first_digest_counts_from_creation() {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let search = kite_search(None, created);
        let jobs = vec![
            dated_job("Before", false, created - Duration::minutes(5)),
            dated_job("After", false, created + Duration::minutes(5)),
        ];
        let matches = digest_matches(&search, &jobs);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "After");
    }

    #[tokio::test]
    async fn failed_stamp_skips_only_that_search() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let broken = ids[1];
        let mut attempted = Vec::new();

        let stamped = stamp_each(ids.clone(), |id| {
            attempted.push(id);
            ready(if id == broken {
                Err(Error::Internal("connection reset".into()))
            } else {
                Ok(())
            })
        })
        .await;

        assert_eq!(attempted, ids);
        assert_eq!(stamped, vec![ids[0], ids[2]]);
    }
}
