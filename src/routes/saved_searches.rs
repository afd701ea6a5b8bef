use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::get_config,
    dto::saved_search_dto::{
        CreateSavedSearchPayload, MatchesQuery, SavedSearchResponse, UpdateSavedSearchPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list_saved_searches(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let searches = state
        .saved_search_service
        .list(claims.user_id()?)
        .await?;
    let items: Vec<SavedSearchResponse> = searches
        .into_iter()
        .map(SavedSearchResponse::from)
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/saved-searches",
    request_body = CreateSavedSearchPayload,
    responses(
        (status = 201, description = "Saved search created", body = Json<SavedSearchResponse>),
        (status = 400, description = "Invalid criteria")
    )
)]
#[axum::debug_handler]
pub async fn create_saved_search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSavedSearchPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let search = state
        .saved_search_service
        .create(claims.user_id()?, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(SavedSearchResponse::from(search))))
}

#[axum::debug_handler]
pub async fn update_saved_search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSavedSearchPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let search = state
        .saved_search_service
        .update(claims.user_id()?, id, payload)
        .await?;
    Ok(Json(SavedSearchResponse::from(search)))
}

#[axum::debug_handler]
pub async fn delete_saved_search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .saved_search_service
        .delete(claims.user_id()?, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current board results for the saved criteria.
#[axum::debug_handler]
pub async fn saved_search_matches(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(query): Query<MatchesQuery>,
) -> Result<impl IntoResponse> {
    let search = state
        .saved_search_service
        .get(claims.user_id()?, id)
        .await?;
    let response = state
        .job_service
        .list_public(
            &search.criteria(),
            query.page.unwrap_or(1),
            get_config().listing_page_size,
        )
        .await?;
    Ok(Json(response))
}
