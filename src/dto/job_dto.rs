use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::LatLng;
use crate::listing::{JobFilter, JobFilterOptions, Page};
use crate::models::job::{EmploymentType, Job};
use crate::utils::validation::{validate_country_code, validate_picture_count};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(custom(function = "validate_country_code"))]
    pub country: String,
    #[validate(length(max = 200))]
    pub salary: Option<String>,
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub sports: Vec<String>,
    #[serde(default)]
    pub occupational_areas: Vec<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_picture_count"))]
    pub pictures: Vec<String>,
    pub coordinates: Option<LatLng>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub country: Option<String>,
    #[validate(length(max = 200))]
    pub salary: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub languages: Option<Vec<String>>,
    pub qualifications: Option<Vec<String>>,
    pub sports: Option<Vec<String>>,
    pub occupational_areas: Option<Vec<String>>,
    pub pictures: Option<Vec<String>>,
    pub coordinates: Option<LatLng>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub country: String,
    pub salary: Option<String>,
    pub employment_type: String,
    pub languages: Vec<String>,
    pub qualifications: Vec<String>,
    pub sports: Vec<String>,
    pub occupational_areas: Vec<String>,
    pub pictures: Vec<String>,
    pub coordinates: LatLng,
    pub featured: bool,
    pub published: bool,
    pub spam: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            recruiter_id: value.recruiter_id,
            company_id: value.company_id,
            title: value.title,
            description: value.description,
            company_name: value.company_name,
            location: value.location,
            country: value.country,
            salary: value.salary,
            employment_type: value.employment_type,
            languages: value.languages,
            qualifications: value.qualifications,
            sports: value.sports,
            occupational_areas: value.occupational_areas,
            pictures: value.pictures,
            coordinates: LatLng {
                lat: value.latitude,
                lng: value.longitude,
            },
            featured: value.featured,
            published: value.published,
            spam: value.spam,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Query string of the public board. Kept flat: the form decoder cannot feed
/// numbers through a flattened struct.
///
/// The server keeps no listing state, so `page` is taken as sent. Clients drop
/// `page` (back to 1) whenever any filter value changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobListQuery {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub sport: Option<String>,
    pub language: Option<String>,
    pub page: Option<usize>,
}

impl JobListQuery {
    /// Requested page; a query without one is page 1.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }

    pub fn filter(&self) -> JobFilter {
        JobFilter {
            keyword: self.keyword.clone(),
            location: self.location.clone(),
            country: self.country.clone(),
            category: self.category.clone(),
            sport: self.sport.clone(),
            language: self.language.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    #[serde(flatten)]
    pub page: Page<JobResponse>,
    pub filters: JobFilterOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    fn parse(uri: &'static str) -> JobListQuery {
        let Query(query) = Query::<JobListQuery>::try_from_uri(&Uri::from_static(uri)).unwrap();
        query
    }

    #[test]
    fn new_filter_without_page_starts_at_one() {
        let query = parse("/api/jobs-list?country=ES&sport=Kitesurfing");
        assert_eq!(query.page(), 1);
        assert_eq!(query.filter().country.as_deref(), Some("ES"));

        let paged = parse("/api/jobs-list?country=ES&page=3");
        assert_eq!(paged.page(), 3);
    }
}
