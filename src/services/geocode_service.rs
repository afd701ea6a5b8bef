use reqwest::Client;
use serde::Deserialize;
use std::future::Future;

use crate::dto::geocode_dto::{Coordinates, GeocodeResult};
use crate::error::Result;
use crate::models::company::Address;

pub const SEARCH_LIMIT: usize = 5;

/// Free-text place lookup.
pub trait Geocoder: Send + Sync + 'static {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<GeocodeResult>>> + Send;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlaceAddress {
    road: Option<String>,
    house_number: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Place {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(default)]
    address: PlaceAddress,
}

impl Place {
    fn into_result(self) -> Option<GeocodeResult> {
        let latitude = self.lat.parse::<f64>().ok()?;
        let longitude = self.lon.parse::<f64>().ok()?;
        let a = self.address;
        let street = match (a.road, a.house_number) {
            (Some(road), Some(number)) => Some(format!("{} {}", road, number)),
            (road, _) => road,
        };
        Some(GeocodeResult {
            display_name: self.display_name,
            latitude,
            longitude,
            address: Address {
                street,
                city: a.city.or(a.town).or(a.village),
                state: a.state,
                postal_code: a.postcode,
                country: a.country_code.map(|c| c.to_uppercase()),
            },
        })
    }
}

/// Client for a Nominatim-compatible geocoding service.
#[derive(Clone)]
pub struct GeocodeService {
    client: Client,
    base_url: String,
}

impl GeocodeService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_places(&self, query: &str, limit: usize) -> Result<Vec<Place>> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.to_string();
        let places = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Place>>()
            .await?;
        Ok(places)
    }

    pub async fn search_places(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        let places = self.fetch_places(query, SEARCH_LIMIT).await?;
        Ok(places.into_iter().filter_map(Place::into_result).collect())
    }

    /// Search for the typeahead box. Upstream failures yield no results.
    pub async fn search_or_empty(&self, query: &str) -> Vec<GeocodeResult> {
        match self.search_places(query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::debug!(error = %e, "geocode search failed");
                Vec::new()
            }
        }
    }

    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let places = self.fetch_places(address, 1).await?;
        Ok(places
            .into_iter()
            .filter_map(Place::into_result)
            .next()
            .map(|r| Coordinates {
                latitude: r.latitude,
                longitude: r.longitude,
            }))
    }
}

impl Geocoder for GeocodeService {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        self.search_places(query).await
    }
}
