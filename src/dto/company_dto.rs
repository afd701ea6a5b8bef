use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::LatLng;
use crate::models::company::{Address, Company, Contact, SocialMedia};
use crate::utils::validation::validate_picture_count;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Address,
    pub coordinates: Option<LatLng>,
    #[validate(url)]
    pub website: Option<String>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub social_media: SocialMedia,
    #[serde(default)]
    pub offered_activities: Vec<String>,
    #[serde(default)]
    pub offered_services: Vec<String>,
    pub logo: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_picture_count"))]
    pub pictures: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCompanyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub address: Option<Address>,
    pub coordinates: Option<LatLng>,
    #[validate(url)]
    pub website: Option<String>,
    pub contact: Option<Contact>,
    pub social_media: Option<SocialMedia>,
    pub offered_activities: Option<Vec<String>>,
    pub offered_services: Option<Vec<String>>,
    pub logo: Option<String>,
    pub pictures: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Address,
    pub coordinates: LatLng,
    pub website: Option<String>,
    pub contact: Contact,
    pub social_media: SocialMedia,
    pub offered_activities: Vec<String>,
    pub offered_services: Vec<String>,
    pub logo: Option<String>,
    pub pictures: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyListQuery {
    pub featured: Option<bool>,
}

impl From<Company> for CompanyResponse {
    fn from(value: Company) -> Self {
        Self {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            description: value.description,
            address: value.address.0,
            coordinates: LatLng {
                lat: value.latitude,
                lng: value.longitude,
            },
            website: value.website,
            contact: value.contact.0,
            social_media: value.social_media.0,
            offered_activities: value.offered_activities,
            offered_services: value.offered_services,
            logo: value.logo,
            pictures: value.pictures,
            featured: value.featured,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
