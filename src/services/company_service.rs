use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::AdminUpdateCompanyPayload;
use crate::dto::company_dto::{CreateCompanyPayload, UpdateCompanyPayload};
use crate::dto::LatLng;
use crate::error::{Error, Result};
use crate::listing::sort_featured_first;
use crate::models::company::{Address, Company, Contact, SocialMedia};
use crate::services::upload_service::MAX_PICTURES;
use crate::utils::validation::require_coordinates;
use crate::vocabulary::{select, OFFERED_SERVICES, SPORTS};

const COMPANY_COLUMNS: &str = "id, owner_id, name, description, address, latitude, longitude, \
     website, contact, social_media, offered_activities, offered_services, logo, pictures, \
     featured, created_at, updated_at";

/// Company profile after validation, ready to be written.
#[derive(Debug, Clone, PartialEq)]
struct CompanyFields {
    name: String,
    description: Option<String>,
    address: Address,
    latitude: f64,
    longitude: f64,
    website: Option<String>,
    contact: Contact,
    social_media: SocialMedia,
    offered_activities: Vec<String>,
    offered_services: Vec<String>,
    logo: Option<String>,
    pictures: Vec<String>,
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

impl CompanyFields {
    fn from_create(payload: CreateCompanyPayload) -> Result<Self> {
        let (lat, lng) = LatLng::parts(payload.coordinates);
        let (latitude, longitude) = require_coordinates(lat, lng)?;
        check_pictures(&payload.pictures)?;
        Ok(Self {
            name: payload.name.trim().to_string(),
            description: payload.description,
            address: payload.address,
            latitude,
            longitude,
            website: payload.website,
            contact: payload.contact,
            social_media: payload.social_media,
            offered_activities: select(SPORTS, None, &payload.offered_activities)?,
            offered_services: select(OFFERED_SERVICES, None, &payload.offered_services)?,
            logo: payload.logo,
            pictures: payload.pictures,
        })
    }

    fn merge(existing: &Company, payload: UpdateCompanyPayload) -> Result<Self> {
        let (latitude, longitude) = match payload.coordinates {
            Some(c) => require_coordinates(Some(c.lat), Some(c.lng))?,
            None => require_coordinates(Some(existing.latitude), Some(existing.longitude))?,
        };
        let pictures = payload.pictures.unwrap_or_else(|| existing.pictures.clone());
        check_pictures(&pictures)?;
        let offered_activities = match payload.offered_activities {
            Some(values) => select(SPORTS, None, &values)?,
            None => existing.offered_activities.clone(),
        };
        let offered_services = match payload.offered_services {
            Some(values) => select(OFFERED_SERVICES, None, &values)?,
            None => existing.offered_services.clone(),
        };
        Ok(Self {
            name: payload
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| existing.name.clone()),
            description: payload.description.or_else(|| existing.description.clone()),
            address: payload.address.unwrap_or_else(|| existing.address.0.clone()),
            latitude,
            longitude,
            website: payload.website.or_else(|| existing.website.clone()),
            contact: payload.contact.unwrap_or_else(|| existing.contact.0.clone()),
            social_media: payload
                .social_media
                .unwrap_or_else(|| existing.social_media.0.clone()),
            offered_activities,
            offered_services,
            logo: payload.logo.or_else(|| existing.logo.clone()),
            pictures,
        })
    }
}

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public directory, featured companies first.
    pub async fn list(&self, featured_only: bool) -> Result<Vec<Company>> {
        let sql = format!(
            "SELECT {} FROM companies WHERE ($1 = FALSE OR featured) ORDER BY created_at DESC",
            COMPANY_COLUMNS
        );
        let mut companies = sqlx::query_as::<_, Company>(&sql)
            .bind(featured_only)
            .fetch_all(&self.pool)
            .await?;
        sort_featured_first(&mut companies);
        Ok(companies)
    }

    pub async fn get(&self, id: Uuid) -> Result<Company> {
        let sql = format!("SELECT {} FROM companies WHERE id = $1", COMPANY_COLUMNS);
        sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("company_not_found".into()))
    }

    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Company>> {
        let sql = format!("SELECT {} FROM companies WHERE owner_id = $1", COMPANY_COLUMNS);
        Ok(sqlx::query_as::<_, Company>(&sql)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_by_owner(&self, owner_id: Uuid) -> Result<Company> {
        self.find_by_owner(owner_id)
            .await?
            .ok_or_else(|| Error::NotFound("company_not_found".into()))
    }

    /// One company per recruiter; validation runs before any query.
    pub async fn create(&self, owner_id: Uuid, payload: CreateCompanyPayload) -> Result<Company> {
        let fields = CompanyFields::from_create(payload)?;
        let sql = format!(
            r#"
            INSERT INTO companies (
                owner_id, name, description, address, latitude, longitude, website,
                contact, social_media, offered_activities, offered_services, logo, pictures
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(owner_id)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(Json(&fields.address))
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(&fields.website)
            .bind(Json(&fields.contact))
            .bind(Json(&fields.social_media))
            .bind(&fields.offered_activities)
            .bind(&fields.offered_services)
            .bind(&fields.logo)
            .bind(&fields.pictures)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => Error::Conflict("company_exists".into()),
                other => other,
            })?;
        tracing::info!(company_id = %company.id, owner_id = %owner_id, "company created");
        Ok(company)
    }

    pub async fn update(&self, owner_id: Uuid, payload: UpdateCompanyPayload) -> Result<Company> {
        let existing = self.get_by_owner(owner_id).await?;
        let fields = CompanyFields::merge(&existing, payload)?;

        let mut tx = self.pool.begin().await?;
        let sql = format!(
            r#"
            UPDATE companies
            SET name = $2, description = $3, address = $4, latitude = $5, longitude = $6,
                website = $7, contact = $8, social_media = $9, offered_activities = $10,
                offered_services = $11, logo = $12, pictures = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(existing.id)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(Json(&fields.address))
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(&fields.website)
            .bind(Json(&fields.contact))
            .bind(Json(&fields.social_media))
            .bind(&fields.offered_activities)
            .bind(&fields.offered_services)
            .bind(&fields.logo)
            .bind(&fields.pictures)
            .fetch_one(&mut *tx)
            .await?;
        if company.name != existing.name {
            sqlx::query("UPDATE jobs SET company_name = $2 WHERE company_id = $1")
                .bind(company.id)
                .bind(&company.name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(company)
    }

    pub async fn admin_update(&self, id: Uuid, payload: AdminUpdateCompanyPayload) -> Result<Company> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            r#"
            UPDATE companies
            SET name = COALESCE($2, name),
                featured = COALESCE($3, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .bind(payload.name.as_deref().map(str::trim))
            .bind(payload.featured)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("company_not_found".into()))?;
        if payload.name.is_some() {
            sqlx::query("UPDATE jobs SET company_name = $2 WHERE company_id = $1")
                .bind(company.id)
                .bind(&company.name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(company)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("company_not_found".into()));
        }
        Ok(())
    }
}
