use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, ApplicationStatus};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPayload {
    pub job_id: Uuid,
    #[validate(length(max = 5000))]
    pub cover_letter: Option<String>,
}

/// Recruiters may change every field; candidates may only archive.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateApplicationPayload {
    pub status: Option<ApplicationStatus>,
    #[validate(length(max = 5000))]
    pub recruiter_notes: Option<String>,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub candidate_id: Uuid,
    pub cv_id: Uuid,
    pub status: String,
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruiter_notes: Option<String>,
    pub archived_by_candidate: bool,
    pub archived_by_recruiter: bool,
}

impl ApplicationResponse {
    /// Candidates never see the recruiter's private notes.
    pub fn for_candidate(value: Application) -> Self {
        let mut response = Self::from(value);
        response.recruiter_notes = None;
        response
    }
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            company_id: value.company_id,
            candidate_id: value.candidate_id,
            cv_id: value.cv_id,
            status: value.status,
            cover_letter: value.cover_letter,
            applied_at: value.applied_at,
            last_activity_at: value.last_activity_at,
            withdrawn_at: value.withdrawn_at,
            viewed_at: value.viewed_at,
            recruiter_notes: value.recruiter_notes,
            archived_by_candidate: value.archived_by_candidate,
            archived_by_recruiter: value.archived_by_recruiter,
        }
    }
}
