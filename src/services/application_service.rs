use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::{ApplyPayload, UpdateApplicationPayload};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::user::Role;

const APPLICATION_COLUMNS: &str = "id, job_id, company_id, candidate_id, cv_id, status, \
     cover_letter, applied_at, last_activity_at, withdrawn_at, viewed_at, recruiter_notes, \
     archived_by_candidate, archived_by_recruiter";

/// Row values an update resolves to.
#[derive(Debug, Clone, PartialEq)]
struct ApplicationChange {
    status: ApplicationStatus,
    recruiter_notes: Option<String>,
    archived_by_candidate: bool,
    archived_by_recruiter: bool,
    status_changed: bool,
}

fn current_status(application: &Application) -> Result<ApplicationStatus> {
    application.status.parse().map_err(Error::Internal)
}

/// Candidates may only archive their own copy; recruiters move the status
/// along, keep notes and archive on their side. Withdrawal is terminal.
fn plan_update(application: &Application, role: Role, payload: UpdateApplicationPayload) -> Result<ApplicationChange> {
    let current = current_status(application)?;
    let mut change = ApplicationChange {
        status: current,
        recruiter_notes: application.recruiter_notes.clone(),
        archived_by_candidate: application.archived_by_candidate,
        archived_by_recruiter: application.archived_by_recruiter,
        status_changed: false,
    };

    if role == Role::JobSeeker {
        if payload.status.is_some() || payload.recruiter_notes.is_some() {
            return Err(Error::Forbidden("candidates_can_only_archive".into()));
        }
        if let Some(archived) = payload.archived {
            change.archived_by_candidate = archived;
        }
        return Ok(change);
    }

    if let Some(next) = payload.status {
        if next != current {
            if !current.recruiter_can_move_to(next) {
                return Err(Error::BadRequest("invalid_status_transition".into()));
            }
            change.status = next;
            change.status_changed = true;
        }
    }
    if let Some(notes) = payload.recruiter_notes {
        let notes = notes.trim();
        change.recruiter_notes = (!notes.is_empty()).then(|| notes.to_string());
    }
    if let Some(archived) = payload.archived {
        change.archived_by_recruiter = archived;
    }
    Ok(change)
}

fn check_withdrawable(application: &Application) -> Result<()> {
    if current_status(application)? == ApplicationStatus::Withdrawn {
        return Err(Error::Conflict("already_withdrawn".into()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies with the candidate's CV to a visible job, once per job.
    pub async fn apply(&self, candidate_id: Uuid, payload: ApplyPayload) -> Result<Application> {
        let job: Option<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT id, company_id FROM jobs WHERE id = $1 AND published AND spam = 'no'",
        )
        .bind(payload.job_id)
        .fetch_optional(&self.pool)
        .await?;
        let (job_id, company_id) = job.ok_or_else(|| Error::NotFound("job_not_found".into()))?;

        let cv: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM cvs WHERE owner_id = $1")
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await?;
        let (cv_id,) = cv.ok_or_else(|| Error::BadRequest("cv_required".into()))?;

        let cover_letter = payload
            .cover_letter
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let sql = format!(
            r#"
            INSERT INTO applications (job_id, company_id, candidate_id, cv_id, cover_letter)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&sql)
            .bind(job_id)
            .bind(company_id)
            .bind(candidate_id)
            .bind(cv_id)
            .bind(cover_letter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => Error::Conflict("already_applied".into()),
                other => other,
            })?;
        tracing::info!(application_id = %application.id, job_id = %job_id, "application submitted");
        Ok(application)
    }

    pub async fn get(&self, id: Uuid) -> Result<Application> {
        let sql = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("application_not_found".into()))
    }

    pub async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {} FROM applications WHERE candidate_id = $1 ORDER BY applied_at DESC",
            APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Recruiter view of a job's applicants. The first view stamps `viewed_at`.
    pub async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let viewed = sqlx::query(
            "UPDATE applications SET viewed_at = NOW() WHERE job_id = $1 AND viewed_at IS NULL",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        if viewed.rows_affected() > 0 {
            tracing::debug!(job_id = %job_id, count = viewed.rows_affected(), "applications marked viewed");
        }
        let sql = format!(
            "SELECT {} FROM applications WHERE job_id = $1 ORDER BY applied_at DESC",
            APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn job_owner(&self, job_id: Uuid) -> Result<Uuid> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT recruiter_id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(owner,)| owner)
            .ok_or_else(|| Error::NotFound("job_not_found".into()))
    }

    pub async fn update(&self, actor_id: Uuid, role: Role, id: Uuid, payload: UpdateApplicationPayload) -> Result<Application> {
        let application = self.get(id).await?;
        match role {
            Role::JobSeeker => {
                if application.candidate_id != actor_id {
                    return Err(Error::NotFound("application_not_found".into()));
                }
            }
            Role::Recruiter => {
                if self.job_owner(application.job_id).await? != actor_id {
                    return Err(Error::Forbidden("not_your_job".into()));
                }
            }
            Role::Admin => {}
        }

        let change = plan_update(&application, role, payload)?;
        let sql = format!(
            r#"
            UPDATE applications
            SET status = $2,
                recruiter_notes = $3,
                archived_by_candidate = $4,
                archived_by_recruiter = $5,
                last_activity_at = CASE WHEN $6 THEN NOW() ELSE last_activity_at END
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let updated = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .bind(change.status.as_str())
            .bind(&change.recruiter_notes)
            .bind(change.archived_by_candidate)
            .bind(change.archived_by_recruiter)
            .bind(change.status_changed)
            .fetch_one(&self.pool)
            .await?;
        if change.status_changed {
            tracing::info!(application_id = %id, status = %updated.status, "application status changed");
        }
        Ok(updated)
    }

    pub async fn withdraw(&self, candidate_id: Uuid, id: Uuid) -> Result<Application> {
        let application = self.get(id).await?;
        if application.candidate_id != candidate_id {
            return Err(Error::NotFound("application_not_found".into()));
        }
        check_withdrawable(&application)?;
        let sql = format!(
            r#"
            UPDATE applications
            SET status = 'withdrawn', withdrawn_at = NOW(), last_activity_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let updated = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(application_id = %id, "application withdrawn");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn application(status: &str) -> Application {
        let now = Utc::now();
        Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            cv_id: Uuid::new_v4(),
            status: status.into(),
            cover_letter: None,
            applied_at: now,
            last_activity_at: now,
            withdrawn_at: None,
            viewed_at: None,
            recruiter_notes: None,
            archived_by_candidate: false,
            archived_by_recruiter: false,
        }
    }

    #[test]
    fn recruiter_moves_status_and_keeps_notes() {
        let change = plan_update(
            &application("new"),
            Role::Recruiter,
            UpdateApplicationPayload {
                status: Some(ApplicationStatus::Interviewed),
                recruiter_notes: Some("  strong IKO background ".into()),
                archived: None,
            },
        )
        .unwrap();
        assert_eq!(change.status, ApplicationStatus::Interviewed);
        assert!(change.status_changed);
        assert_eq!(change.recruiter_notes.as_deref(), Some("strong IKO background"));
    }

    #[test]
    fn recruiter_cannot_withdraw_or_revive() {
        let withdraw = UpdateApplicationPayload {
            status: Some(ApplicationStatus::Withdrawn),
            ..UpdateApplicationPayload::default()
        };
        assert!(matches!(
            plan_update(&application("contacted"), Role::Recruiter, withdraw),
            Err(Error::BadRequest(_))
        ));

        let revive = UpdateApplicationPayload {
            status: Some(ApplicationStatus::Offered),
            ..UpdateApplicationPayload::default()
        };
        assert!(matches!(
            plan_update(&application("withdrawn"), Role::Recruiter, revive),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn candidate_can_only_archive() {
        let change = plan_update(
            &application("rejected"),
            Role::JobSeeker,
            UpdateApplicationPayload {
                archived: Some(true),
                ..UpdateApplicationPayload::default()
            },
        )
        .unwrap();
        assert!(change.archived_by_candidate);
        assert!(!change.archived_by_recruiter);
        assert!(!change.status_changed);

        let sneaky = UpdateApplicationPayload {
            status: Some(ApplicationStatus::Offered),
            ..UpdateApplicationPayload::default()
        };
        assert!(matches!(
            plan_update(&application("new"), Role::JobSeeker, sneaky),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn withdrawing_twice_conflicts() {
        assert!(check_withdrawable(&application("offered")).is_ok());
        assert!(matches!(
            check_withdrawable(&application("withdrawn")),
            Err(Error::Conflict(_))
        ));
    }
}
