use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::company::Address;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeSearchResponse {
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeocodeSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GeocodeRequest {
    #[validate(length(min = 3, max = 512))]
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}
