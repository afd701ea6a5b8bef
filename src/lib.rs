pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
pub mod vocabulary;

use crate::services::{
    application_service::ApplicationService, audit_service::AuditService,
    company_service::CompanyService, cv_service::CvService, digest_service::DigestService,
    geocode_service::GeocodeService, job_service::JobService,
    saved_search_service::SavedSearchService, upload_service::UploadService,
    user_service::UserService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub company_service: CompanyService,
    pub job_service: JobService,
    pub cv_service: CvService,
    pub application_service: ApplicationService,
    pub saved_search_service: SavedSearchService,
    pub audit_service: AuditService,
    pub geocode_service: GeocodeService,
    pub upload_service: UploadService,
}

impl AppState {
    pub fn new(pool: PgPool) -> error::Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| error::Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            user_service: UserService::new(pool.clone()),
            company_service: CompanyService::new(pool.clone()),
            job_service: JobService::new(pool.clone()),
            cv_service: CvService::new(pool.clone()),
            application_service: ApplicationService::new(pool.clone()),
            saved_search_service: SavedSearchService::new(pool.clone()),
            audit_service: AuditService::new(pool.clone()),
            geocode_service: GeocodeService::new(http_client, config.geocoder_url.clone()),
            upload_service: UploadService::new(&config.uploads_dir),
            pool,
        })
    }

    pub fn digest_service(&self) -> DigestService {
        DigestService::new(
            self.saved_search_service.clone(),
            self.job_service.clone(),
            self.audit_service.clone(),
        )
    }
}
