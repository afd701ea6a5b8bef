use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    config::get_config,
    dto::cv_dto::{CandidateListQuery, CvResponse},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

/// Published CVs for recruiters, with the dropdown option sets attached.
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let response = state
        .cv_service
        .list_candidates(
            &query.filter(),
            query.page(),
            get_config().listing_page_size,
        )
        .await?;
    Ok(Json(response))
}

/// One CV: published ones, or an unpublished one that applied to the caller's
/// jobs.
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let cv = state
        .cv_service
        .get_for_recruiter(id, claims.user_id()?, claims.is_admin())
        .await?;
    Ok(Json(CvResponse::from(cv)))
}
