use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::cv_dto::{CreateCvPayload, CvResponse, UpdateCvPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn get_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let cv = state.cv_service.get_by_owner(claims.user_id()?).await?;
    Ok(Json(CvResponse::from(cv)))
}

#[utoipa::path(
    post,
    path = "/api/cv",
    request_body = CreateCvPayload,
    responses(
        (status = 201, description = "CV created", body = Json<CvResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "CV already exists")
    )
)]
#[axum::debug_handler]
pub async fn create_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCvPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let cv = state.cv_service.create(claims.user_id()?, payload).await?;
    Ok((StatusCode::CREATED, Json(CvResponse::from(cv))))
}

#[utoipa::path(
    patch,
    path = "/api/cv",
    request_body = UpdateCvPayload,
    responses(
        (status = 200, description = "CV updated", body = Json<CvResponse>),
        (status = 404, description = "No CV yet")
    )
)]
#[axum::debug_handler]
pub async fn update_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateCvPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let cv = state.cv_service.update(claims.user_id()?, payload).await?;
    Ok(Json(CvResponse::from(cv)))
}

#[axum::debug_handler]
pub async fn delete_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    state.cv_service.delete(claims.user_id()?).await?;
    Ok(StatusCode::NO_CONTENT)
}
