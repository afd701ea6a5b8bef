use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::AdminUpdateJobPayload;
use crate::dto::job_dto::{CreateJobPayload, JobListResponse, JobResponse, UpdateJobPayload};
use crate::dto::LatLng;
use crate::error::{Error, Result};
use crate::listing::{paginate, sort_featured_first, JobFilter, JobFilterOptions};
use crate::models::company::Company;
use crate::models::job::{EmploymentType, Job};
use crate::services::upload_service::MAX_PICTURES;
use crate::utils::validation::{require_coordinates, validate_country_code};
use crate::vocabulary::{
    select, LANGUAGES, MAX_JOB_LANGUAGES, OCCUPATIONAL_AREAS, QUALIFICATIONS, SPORTS,
};

const JOB_COLUMNS: &str = "id, recruiter_id, company_id, title, description, company_name, \
     location, country, salary, employment_type, languages, qualifications, sports, \
     occupational_areas, pictures, latitude, longitude, featured, published, spam, \
     created_at, updated_at";

/// Runs the board pipeline over an already loaded list: options from the
/// full list, then filter, sort and page.
pub fn board(jobs: Vec<Job>, filter: &JobFilter, page: usize, per_page: usize) -> JobListResponse {
    let filters = JobFilterOptions::from_jobs(&jobs);
    let mut visible = filter.apply(jobs);
    sort_featured_first(&mut visible);
    JobListResponse {
        page: paginate(visible, page, per_page).map(JobResponse::from),
        filters,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct JobFields {
    title: String,
    description: String,
    location: String,
    country: String,
    salary: Option<String>,
    employment_type: EmploymentType,
    languages: Vec<String>,
    qualifications: Vec<String>,
    sports: Vec<String>,
    occupational_areas: Vec<String>,
    pictures: Vec<String>,
    latitude: f64,
    longitude: f64,
    published: bool,
}

fn normalize_country(country: &str) -> Result<String> {
    let country = country.trim();
    validate_country_code(country).map_err(|_| Error::BadRequest("invalid_country".into()))?;
    Ok(country.to_uppercase())
}

fn check_pictures(pictures: &[String]) -> Result<()> {
    if pictures.len() > MAX_PICTURES {
        return Err(Error::BadRequest(format!(
            "You can upload at most {} pictures",
            MAX_PICTURES
        )));
    }
    Ok(())
}

impl JobFields {
    fn from_create(payload: CreateJobPayload) -> Result<Self> {
        let (lat, lng) = LatLng::parts(payload.coordinates);
        let (latitude, longitude) = require_coordinates(lat, lng)?;
        check_pictures(&payload.pictures)?;
        Ok(Self {
            title: payload.title.trim().to_string(),
            description: payload.description,
            location: payload.location.trim().to_string(),
            country: normalize_country(&payload.country)?,
            salary: payload.salary,
            employment_type: payload.employment_type,
            languages: select(LANGUAGES, Some(MAX_JOB_LANGUAGES), &payload.languages)?,
            qualifications: select(QUALIFICATIONS, None, &payload.qualifications)?,
            sports: select(SPORTS, None, &payload.sports)?,
            occupational_areas: select(OCCUPATIONAL_AREAS, None, &payload.occupational_areas)?,
            pictures: payload.pictures,
            latitude,
            longitude,
            published: payload.published.unwrap_or(true),
        })
    }

    fn merge(existing: &Job, payload: UpdateJobPayload) -> Result<Self> {
        let (latitude, longitude) = match payload.coordinates {
            Some(c) => require_coordinates(Some(c.lat), Some(c.lng))?,
            None => require_coordinates(Some(existing.latitude), Some(existing.longitude))?,
        };
        let pictures = payload.pictures.unwrap_or_else(|| existing.pictures.clone());
        check_pictures(&pictures)?;
        let employment_type = match payload.employment_type {
            Some(kind) => kind,
            None => existing
                .employment_type
                .parse()
                .map_err(Error::Internal)?,
        };
        let pick = |values: Option<Vec<String>>,
                    current: &Vec<String>,
                    options: &[&str],
                    cap: Option<usize>|
         -> Result<Vec<String>> {
            match values {
                Some(values) => Ok(select(options, cap, &values)?),
                None => Ok(current.clone()),
            }
        };
        Ok(Self {
            title: payload
                .title
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| existing.title.clone()),
            description: payload
                .description
                .unwrap_or_else(|| existing.description.clone()),
            location: payload
                .location
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| existing.location.clone()),
            country: match payload.country {
                Some(country) => normalize_country(&country)?,
                None => existing.country.clone(),
            },
            salary: payload.salary.or_else(|| existing.salary.clone()),
            employment_type,
            languages: pick(
                payload.languages,
                &existing.languages,
                LANGUAGES,
                Some(MAX_JOB_LANGUAGES),
            )?,
            qualifications: pick(
                payload.qualifications,
                &existing.qualifications,
                QUALIFICATIONS,
                None,
            )?,
            sports: pick(payload.sports, &existing.sports, SPORTS, None)?,
            occupational_areas: pick(
                payload.occupational_areas,
                &existing.occupational_areas,
                OCCUPATIONAL_AREAS,
                None,
            )?,
            pictures,
            latitude,
            longitude,
            published: payload.published.unwrap_or(existing.published),
        })
    }
}

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Everything the public board may show: published and not flagged.
    pub async fn published(&self) -> Result<Vec<Job>> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE published AND spam = 'no' ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn published_since(&self, since: DateTime<Utc>) -> Result<Vec<Job>> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE published AND spam = 'no' AND created_at > $1 \
             ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(since)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list_public(&self, filter: &JobFilter, page: usize, per_page: usize) -> Result<JobListResponse> {
        let jobs = self.published().await?;
        Ok(board(jobs, filter, page, per_page))
    }

    pub async fn get_public(&self, id: Uuid) -> Result<Job> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE id = $1 AND published AND spam = 'no'",
            JOB_COLUMNS
        );
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("job_not_found".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Job> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("job_not_found".into()))
    }

    /// A recruiter's own job. Admins may act on any job.
    pub async fn get_owned(&self, id: Uuid, recruiter_id: Uuid, is_admin: bool) -> Result<Job> {
        let job = self.get(id).await?;
        if !is_admin && job.recruiter_id != recruiter_id {
            return Err(Error::Forbidden("not_your_job".into()));
        }
        Ok(job)
    }

    pub async fn list_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Job>> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE recruiter_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(recruiter_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Job>> {
        let sql = format!("SELECT {} FROM jobs ORDER BY created_at DESC", JOB_COLUMNS);
        Ok(sqlx::query_as::<_, Job>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn create(&self, recruiter_id: Uuid, company: &Company, payload: CreateJobPayload) -> Result<Job> {
        let fields = JobFields::from_create(payload)?;
        let sql = format!(
            r#"
            INSERT INTO jobs (
                recruiter_id, company_id, company_name, title, description, location, country,
                salary, employment_type, languages, qualifications, sports, occupational_areas,
                pictures, latitude, longitude, published
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(recruiter_id)
            .bind(company.id)
            .bind(&company.name)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.location)
            .bind(&fields.country)
            .bind(&fields.salary)
            .bind(fields.employment_type.as_str())
            .bind(&fields.languages)
            .bind(&fields.qualifications)
            .bind(&fields.sports)
            .bind(&fields.occupational_areas)
            .bind(&fields.pictures)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(fields.published)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(job_id = %job.id, recruiter_id = %recruiter_id, "job created");
        Ok(job)
    }

    pub async fn update(&self, existing: &Job, payload: UpdateJobPayload) -> Result<Job> {
        let fields = JobFields::merge(existing, payload)?;
        let sql = format!(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, location = $4, country = $5, salary = $6,
                employment_type = $7, languages = $8, qualifications = $9, sports = $10,
                occupational_areas = $11, pictures = $12, latitude = $13, longitude = $14,
                published = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(existing.id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.location)
            .bind(&fields.country)
            .bind(&fields.salary)
            .bind(fields.employment_type.as_str())
            .bind(&fields.languages)
            .bind(&fields.qualifications)
            .bind(&fields.sports)
            .bind(&fields.occupational_areas)
            .bind(&fields.pictures)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(fields.published)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn admin_update(&self, id: Uuid, payload: AdminUpdateJobPayload) -> Result<Job> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET featured = COALESCE($2, featured),
                published = COALESCE($3, published),
                spam = COALESCE($4, spam),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(payload.featured)
            .bind(payload.published)
            .bind(payload.spam.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("job_not_found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("job_not_found".into()));
        }
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::filter::fixtures::{dated_job, job};
    use crate::listing::PageLink;
    use chrono::{Duration, TimeZone};

    fn payload() -> CreateJobPayload {
        CreateJobPayload {
            title: "Kite instructor".into(),
            description: "IKO level 2, season May to October".into(),
            location: "Tarifa".into(),
            country: "es".into(),
            salary: Some("1800 EUR / month".into()),
            employment_type: EmploymentType::FullTime,
            languages: vec!["english".into(), "Spanish".into()],
            qualifications: vec!["IKO Instructor Level 2".into()],
            sports: vec!["Kitesurfing".into()],
            occupational_areas: vec!["Instruction".into()],
            pictures: Vec::new(),
            coordinates: Some(LatLng { lat: 36.01, lng: -5.6 }),
            published: None,
        }
    }

    #[test]
    fn create_normalizes_country_and_vocabulary() {
        let fields = JobFields::from_create(payload()).unwrap();
        assert_eq!(fields.country, "ES");
        assert_eq!(fields.languages, vec!["English", "Spanish"]);
        assert!(fields.published);
    }

    #[test]
    fn create_rejects_fourth_language_and_missing_coordinates() {
        let mut many = payload();
        many.languages = vec!["English".into(), "Spanish".into(), "French".into(), "German".into()];
        assert!(matches!(JobFields::from_create(many), Err(Error::Selection(_))));

        let mut nowhere = payload();
        nowhere.coordinates = None;
        assert!(matches!(JobFields::from_create(nowhere), Err(Error::BadRequest(_))));
    }

    #[test]
    fn merge_only_touches_given_fields() {
        let existing = job("Dive guide", "GR", &["Scuba Diving"]);
        let fields = JobFields::merge(
            &existing,
            UpdateJobPayload {
                published: Some(false),
                sports: Some(vec!["freediving".into()]),
                ..UpdateJobPayload::default()
            },
        )
        .unwrap();
        assert_eq!(fields.title, "Dive guide");
        assert_eq!(fields.country, "GR");
        assert_eq!(fields.sports, vec!["Freediving"]);
        assert_eq!(fields.employment_type, EmploymentType::FullTime);
        assert!(!fields.published);
    }

    #[test]
    fn board_orders_featured_then_newest_after_filtering() {
        let base = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let jobs = vec![
            dated_job("Instructor", false, base + Duration::days(3)),
            dated_job("Coach", true, base),
            dated_job("Receptionist", false, base + Duration::days(5)),
            job("Skipper", "GR", &["Sailing"]),
        ];
        let filter = JobFilter {
            country: Some("es".into()),
            ..JobFilter::default()
        };

        let response = board(jobs, &filter, 1, 20);
        let titles: Vec<_> = response.page.items.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Coach", "Receptionist", "Instructor"]);
        assert_eq!(response.page.pagination.total, 3);
        assert_eq!(response.filters.countries, vec!["ES", "GR"]);
    }

    #[test]
    fn board_pages_and_keeps_full_option_sets() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut jobs: Vec<Job> = (0..45)
            .map(|i| dated_job(&format!("Job {}", i), false, base + Duration::hours(i)))
            .collect();
        jobs.push(job("Surf coach", "PT", &["Surfing"]));
        let filter = JobFilter {
            country: Some("ES".into()),
            ..JobFilter::default()
        };

        let response = board(jobs, &filter, 3, 20);
        assert_eq!(response.page.pagination.total, 45);
        assert_eq!(response.page.pagination.total_pages, 3);
        assert_eq!(response.page.items.len(), 5);
        assert_eq!(response.page.items[4].title, "Job 0");
        assert_eq!(response.filters.countries, vec!["ES", "PT"]);
        assert!(matches!(
            response.page.page_window.last(),
            Some(PageLink::Page { number: 3, current: true })
        ));
    }
}
