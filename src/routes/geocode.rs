use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::geocode_dto::{Coordinates, GeocodeRequest, GeocodeSearchQuery, GeocodeSearchResponse},
    error::{Error, Result},
    services::location_search::MIN_QUERY_LEN,
    AppState,
};

/// Typeahead proxy. Never fails: short queries and upstream errors both
/// produce an empty list.
#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<GeocodeSearchQuery>,
) -> Json<GeocodeSearchResponse> {
    let q = query.q.unwrap_or_default();
    let q = q.trim();
    if q.chars().count() < MIN_QUERY_LEN {
        return Json(GeocodeSearchResponse { results: Vec::new() });
    }
    let results = state.geocode_service.search_or_empty(q).await;
    Json(GeocodeSearchResponse { results })
}

#[utoipa::path(
    post,
    path = "/api/geocode",
    request_body = GeocodeRequest,
    responses(
        (status = 200, description = "Coordinates of the best match", body = Json<Coordinates>),
        (status = 404, description = "Nothing matched the address"),
        (status = 502, description = "Geocoder unavailable")
    )
)]
#[axum::debug_handler]
pub async fn geocode(
    State(state): State<AppState>,
    Json(payload): Json<GeocodeRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let coordinates: Coordinates = state
        .geocode_service
        .geocode(payload.address.trim())
        .await?
        .ok_or_else(|| Error::NotFound("address_not_found".into()))?;
    Ok(Json(coordinates))
}
