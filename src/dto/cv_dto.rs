use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::listing::{CandidateFilterOptions, CvFilter, Page};
use crate::models::cv::{Cv, Education, Experience};
use crate::utils::validation::validate_picture_count;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCvPayload {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 10000))]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub experience_and_skill: Vec<String>,
    #[serde(default)]
    pub professional_certifications: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub looking_for_work_in_areas: Vec<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_picture_count"))]
    pub pictures: Vec<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCvPayload {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 10000))]
    pub summary: Option<String>,
    pub experience: Option<Vec<Experience>>,
    pub education: Option<Vec<Education>>,
    pub skills: Option<Vec<String>>,
    pub certifications: Option<Vec<String>>,
    pub experience_and_skill: Option<Vec<String>>,
    pub professional_certifications: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub looking_for_work_in_areas: Option<Vec<String>>,
    pub pictures: Option<Vec<String>>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub summary: Option<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub experience_and_skill: Vec<String>,
    pub professional_certifications: Vec<String>,
    pub languages: Vec<String>,
    pub looking_for_work_in_areas: Vec<String>,
    pub pictures: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Cv> for CvResponse {
    fn from(value: Cv) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            full_name: value.full_name,
            email: value.email,
            phone: value.phone,
            address: value.address,
            summary: value.summary,
            experience: value.experience.0,
            education: value.education.0,
            skills: value.skills,
            certifications: value.certifications,
            experience_and_skill: value.experience_and_skill,
            professional_certifications: value.professional_certifications,
            languages: value.languages,
            looking_for_work_in_areas: value.looking_for_work_in_areas,
            pictures: value.pictures,
            published: value.published,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Candidate search query. As with the job board, a changed filter starts
/// again from page 1 on the client; `page` is taken as sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateListQuery {
    pub keyword: Option<String>,
    pub language: Option<String>,
    pub work_area: Option<String>,
    pub sport: Option<String>,
    pub certification: Option<String>,
    pub page: Option<usize>,
}

impl CandidateListQuery {
    /// Requested page; a query without one is page 1.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }

    pub fn filter(&self) -> CvFilter {
        CvFilter {
            keyword: self.keyword.clone(),
            language: self.language.clone(),
            work_area: self.work_area.clone(),
            sport: self.sport.clone(),
            certification: self.certification.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateListResponse {
    #[serde(flatten)]
    pub page: Page<CvResponse>,
    pub filters: CandidateFilterOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    #[test]
    fn candidate_query_defaults_to_first_page() {
        let uri = Uri::from_static("/api/candidates-list?workArea=Instruction");
        let Query(query) = Query::<CandidateListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.page(), 1);
        assert_eq!(query.filter().work_area.as_deref(), Some("Instruction"));
    }
}
