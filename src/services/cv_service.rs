use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::cv_dto::{CandidateListResponse, CreateCvPayload, CvResponse, UpdateCvPayload};
use crate::error::{Error, Result};
use crate::listing::{paginate, CandidateFilterOptions, CvFilter};
use crate::models::cv::{Cv, Education, Experience};
use crate::services::upload_service::MAX_PICTURES;
use crate::vocabulary::{select, LANGUAGES, OCCUPATIONAL_AREAS, QUALIFICATIONS, SPORTS};

const CV_COLUMNS: &str = "id, owner_id, full_name, email, phone, address, summary, experience, \
     education, skills, certifications, experience_and_skill, professional_certifications, \
     languages, looking_for_work_in_areas, pictures, published, created_at, updated_at";

/// Candidate search over published CVs. Option sets are built from the whole
/// list so the dropdowns do not shrink as filters narrow the results.
pub fn candidates(cvs: Vec<Cv>, filter: &CvFilter, page: usize, per_page: usize) -> CandidateListResponse {
    let filters = CandidateFilterOptions::from_cvs(&cvs);
    let visible = filter.apply(cvs);
    CandidateListResponse {
        page: paginate(visible, page, per_page).map(CvResponse::from),
        filters,
    }
}

/// Recruiters see published CVs, plus unpublished ones that applied to one of
/// their jobs. Admins see everything.
pub fn can_view(cv: &Cv, has_application: bool, is_admin: bool) -> bool {
    is_admin || cv.published || has_application
}

#[derive(Debug, Clone, PartialEq)]
struct CvFields {
    full_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    summary: Option<String>,
    experience: Vec<Experience>,
    education: Vec<Education>,
    skills: Vec<String>,
    certifications: Vec<String>,
    experience_and_skill: Vec<String>,
    professional_certifications: Vec<String>,
    languages: Vec<String>,
    looking_for_work_in_areas: Vec<String>,
    pictures: Vec<String>,
    published: bool,
}

fn trimmed_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
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

impl CvFields {
    fn from_create(payload: CreateCvPayload) -> Result<Self> {
        check_pictures(&payload.pictures)?;
        Ok(Self {
            full_name: payload.full_name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            phone: payload.phone,
            address: payload.address,
            summary: payload.summary,
            experience: payload.experience,
            education: payload.education,
            skills: trimmed_list(payload.skills),
            certifications: trimmed_list(payload.certifications),
            experience_and_skill: select(SPORTS, None, &payload.experience_and_skill)?,
            professional_certifications: select(
                QUALIFICATIONS,
                None,
                &payload.professional_certifications,
            )?,
            languages: select(LANGUAGES, None, &payload.languages)?,
            looking_for_work_in_areas: select(
                OCCUPATIONAL_AREAS,
                None,
                &payload.looking_for_work_in_areas,
            )?,
            pictures: payload.pictures,
            published: payload.published.unwrap_or(true),
        })
    }

    fn merge(existing: &Cv, payload: UpdateCvPayload) -> Result<Self> {
        let pictures = payload.pictures.unwrap_or_else(|| existing.pictures.clone());
        check_pictures(&pictures)?;
        let pick = |values: Option<Vec<String>>, current: &[String], options: &[&str]| -> Result<Vec<String>> {
            match values {
                Some(values) => Ok(select(options, None, &values)?),
                None => Ok(current.to_vec()),
            }
        };
        Ok(Self {
            full_name: payload
                .full_name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| existing.full_name.clone()),
            email: payload
                .email
                .map(|e| e.trim().to_lowercase())
                .unwrap_or_else(|| existing.email.clone()),
            phone: payload.phone.or_else(|| existing.phone.clone()),
            address: payload.address.or_else(|| existing.address.clone()),
            summary: payload.summary.or_else(|| existing.summary.clone()),
            experience: payload
                .experience
                .unwrap_or_else(|| existing.experience.0.clone()),
            education: payload
                .education
                .unwrap_or_else(|| existing.education.0.clone()),
            skills: payload
                .skills
                .map(trimmed_list)
                .unwrap_or_else(|| existing.skills.clone()),
            certifications: payload
                .certifications
                .map(trimmed_list)
                .unwrap_or_else(|| existing.certifications.clone()),
            experience_and_skill: pick(
                payload.experience_and_skill,
                &existing.experience_and_skill,
                SPORTS,
            )?,
            professional_certifications: pick(
                payload.professional_certifications,
                &existing.professional_certifications,
                QUALIFICATIONS,
            )?,
            languages: pick(payload.languages, &existing.languages, LANGUAGES)?,
            looking_for_work_in_areas: pick(
                payload.looking_for_work_in_areas,
                &existing.looking_for_work_in_areas,
                OCCUPATIONAL_AREAS,
            )?,
            pictures,
            published: payload.published.unwrap_or(existing.published),
        })
    }
}

#[derive(Clone)]
pub struct CvService {
    pool: PgPool,
}

impl CvService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn published(&self) -> Result<Vec<Cv>> {
        let sql = format!(
            "SELECT {} FROM cvs WHERE published ORDER BY updated_at DESC",
            CV_COLUMNS
        );
        Ok(sqlx::query_as::<_, Cv>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn list_candidates(&self, filter: &CvFilter, page: usize, per_page: usize) -> Result<CandidateListResponse> {
        let cvs = self.published().await?;
        Ok(candidates(cvs, filter, page, per_page))
    }

    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Cv>> {
        let sql = format!("SELECT {} FROM cvs WHERE owner_id = $1", CV_COLUMNS);
        Ok(sqlx::query_as::<_, Cv>(&sql)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_by_owner(&self, owner_id: Uuid) -> Result<Cv> {
        self.find_by_owner(owner_id)
            .await?
            .ok_or_else(|| Error::NotFound("cv_not_found".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Cv> {
        let sql = format!("SELECT {} FROM cvs WHERE id = $1", CV_COLUMNS);
        sqlx::query_as::<_, Cv>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("cv_not_found".into()))
    }

    /// A single CV as seen by a recruiter. Hidden CVs are reported as missing.
    pub async fn get_for_recruiter(&self, id: Uuid, recruiter_id: Uuid, is_admin: bool) -> Result<Cv> {
        let cv = self.get(id).await?;
        if is_admin || cv.published {
            return Ok(cv);
        }
        let (has_application,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applications a
                JOIN jobs j ON j.id = a.job_id
                WHERE a.cv_id = $1 AND j.recruiter_id = $2
            )
            "#,
        )
        .bind(cv.id)
        .bind(recruiter_id)
        .fetch_one(&self.pool)
        .await?;
        if !can_view(&cv, has_application, is_admin) {
            return Err(Error::NotFound("cv_not_found".into()));
        }
        Ok(cv)
    }

    pub async fn create(&self, owner_id: Uuid, payload: CreateCvPayload) -> Result<Cv> {
        let fields = CvFields::from_create(payload)?;
        let sql = format!(
            r#"
            INSERT INTO cvs (
                owner_id, full_name, email, phone, address, summary, experience, education,
                skills, certifications, experience_and_skill, professional_certifications,
                languages, looking_for_work_in_areas, pictures, published
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            CV_COLUMNS
        );
        let cv = sqlx::query_as::<_, Cv>(&sql)
            .bind(owner_id)
            .bind(&fields.full_name)
            .bind(&fields.email)
            .bind(&fields.phone)
            .bind(&fields.address)
            .bind(&fields.summary)
            .bind(Json(&fields.experience))
            .bind(Json(&fields.education))
            .bind(&fields.skills)
            .bind(&fields.certifications)
            .bind(&fields.experience_and_skill)
            .bind(&fields.professional_certifications)
            .bind(&fields.languages)
            .bind(&fields.looking_for_work_in_areas)
            .bind(&fields.pictures)
            .bind(fields.published)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => Error::Conflict("cv_exists".into()),
                other => other,
            })?;
        tracing::info!(cv_id = %cv.id, owner_id = %owner_id, "cv created");
        Ok(cv)
    }

    pub async fn update(&self, owner_id: Uuid, payload: UpdateCvPayload) -> Result<Cv> {
        let existing = self.get_by_owner(owner_id).await?;
        let fields = CvFields::merge(&existing, payload)?;
        let sql = format!(
            r#"
            UPDATE cvs
            SET full_name = $2, email = $3, phone = $4, address = $5, summary = $6,
                experience = $7, education = $8, skills = $9, certifications = $10,
                experience_and_skill = $11, professional_certifications = $12, languages = $13,
                looking_for_work_in_areas = $14, pictures = $15, published = $16,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CV_COLUMNS
        );
        Ok(sqlx::query_as::<_, Cv>(&sql)
            .bind(existing.id)
            .bind(&fields.full_name)
            .bind(&fields.email)
            .bind(&fields.phone)
            .bind(&fields.address)
            .bind(&fields.summary)
            .bind(Json(&fields.experience))
            .bind(Json(&fields.education))
            .bind(&fields.skills)
            .bind(&fields.certifications)
            .bind(&fields.experience_and_skill)
            .bind(&fields.professional_certifications)
            .bind(&fields.languages)
            .bind(&fields.looking_for_work_in_areas)
            .bind(&fields.pictures)
            .bind(fields.published)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn delete(&self, owner_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM cvs WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("cv_not_found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::filter::fixtures::cv;

    #[test]
    fn create_canonicalizes_every_vocabulary_field() {
        let fields = CvFields::from_create(CreateCvPayload {
            full_name: " Ana Ruiz ".into(),
            email: "Ana@Example.com".into(),
            phone: None,
            address: Some("Tarifa".into()),
            summary: None,
            experience: Vec::new(),
            education: Vec::new(),
            skills: vec![" rigging ".into(), "".into()],
            certifications: Vec::new(),
            experience_and_skill: vec!["surfing".into()],
            professional_certifications: vec!["isa surf instructor".into()],
            languages: vec!["spanish".into(), "English".into()],
            looking_for_work_in_areas: vec!["instruction".into()],
            pictures: Vec::new(),
            published: None,
        })
        .unwrap();
        assert_eq!(fields.full_name, "Ana Ruiz");
        assert_eq!(fields.email, "ana@example.com");
        assert_eq!(fields.skills, vec!["rigging"]);
        assert_eq!(fields.experience_and_skill, vec!["Surfing"]);
        assert_eq!(fields.professional_certifications, vec!["ISA Surf Instructor"]);
        assert_eq!(fields.languages, vec!["Spanish", "English"]);
        assert_eq!(fields.looking_for_work_in_areas, vec!["Instruction"]);
    }

    #[test]
    fn hidden_cv_needs_an_application_or_admin() {
        let mut hidden = cv("Ana", &["English"]);
        hidden.published = false;
        assert!(!can_view(&hidden, false, false));
        assert!(can_view(&hidden, true, false));
        assert!(can_view(&hidden, false, true));

        let public = cv("Ben", &["English"]);
        assert!(public.published);
        assert!(can_view(&public, false, false));
    }

    #[test]
    fn merge_rejects_unknown_work_area() {
        let existing = cv("Ana", &["English"]);
        let result = CvFields::merge(
            &existing,
            UpdateCvPayload {
                looking_for_work_in_areas: Some(vec!["Astronaut".into()]),
                ..UpdateCvPayload::default()
            },
        );
        assert!(matches!(result, Err(Error::Selection(_))));
    }

    #[test]
    fn spanish_speakers_only() {
        let cvs = vec![
            cv("Ana", &["English"]),
            cv("Luis", &["Spanish", "English"]),
            cv("Marta", &["Spanish"]),
        ];
        let filter = CvFilter {
            language: Some("Spanish".into()),
            ..CvFilter::default()
        };

        let response = candidates(cvs, &filter, 1, 20);
        let names: Vec<_> = response.page.items.iter().map(|c| c.full_name.as_str()).collect();
        assert_eq!(names, vec!["Luis", "Marta"]);
        assert_eq!(response.page.pagination.total, 2);
        assert_eq!(response.filters.languages, vec!["English", "Spanish"]);
    }
}
