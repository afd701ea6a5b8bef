pub mod application_service;
pub mod audit_service;
pub mod company_service;
pub mod cv_service;
pub mod digest_service;
pub mod export_service;
pub mod geocode_service;
pub mod job_service;
pub mod location_search;
pub mod saved_search_service;
pub mod upload_service;
pub mod user_service;
