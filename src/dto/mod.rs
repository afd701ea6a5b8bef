pub mod admin_dto;
pub mod application_dto;
pub mod auth_dto;
pub mod company_dto;
pub mod cv_dto;
pub mod geocode_dto;
pub mod job_dto;
pub mod saved_search_dto;
pub mod upload_dto;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn parts(value: Option<LatLng>) -> (Option<f64>, Option<f64>) {
        match value {
            Some(c) => (Some(c.lat), Some(c.lng)),
            None => (None, None),
        }
    }
}
