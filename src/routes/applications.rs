use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{ApplicationResponse, ApplyPayload, UpdateApplicationPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<ApplicationResponse>),
        (status = 400, description = "A CV is required to apply"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .apply(claims.user_id()?, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::for_candidate(application)),
    ))
}

#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_candidate(claims.user_id()?)
        .await?;
    let items: Vec<ApplicationResponse> = applications
        .into_iter()
        .map(ApplicationResponse::for_candidate)
        .collect();
    Ok(Json(items))
}

#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .withdraw(claims.user_id()?, id)
        .await?;
    Ok(Json(ApplicationResponse::for_candidate(application)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Applicants for the job", body = Json<Vec<ApplicationResponse>>),
        (status = 403, description = "Job belongs to another recruiter")
    )
)]
#[axum::debug_handler]
pub async fn list_for_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .get_owned(id, claims.user_id()?, claims.is_admin())
        .await?;
    let applications = state.application_service.list_for_job(job.id).await?;
    let items: Vec<ApplicationResponse> = applications
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();
    Ok(Json(items))
}

/// Shared by both sides of an application; the service decides what each
/// role may change.
#[axum::debug_handler]
pub async fn update_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let role = claims
        .role()
        .ok_or_else(|| Error::Unauthorized("invalid_token".into()))?;
    let application = state
        .application_service
        .update(claims.user_id()?, role, id, payload)
        .await?;
    let response = match role {
        crate::models::user::Role::JobSeeker => ApplicationResponse::for_candidate(application),
        _ => ApplicationResponse::from(application),
    };
    Ok(Json(response))
}
