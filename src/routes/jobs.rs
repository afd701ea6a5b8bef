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
    dto::job_dto::{CreateJobPayload, JobListQuery, JobResponse, UpdateJobPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

/// Public board: published, non-spam jobs filtered, featured first, paged.
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let response = state
        .job_service
        .list_public(
            &query.filter(),
            query.page(),
            get_config().listing_page_size,
        )
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Published job", body = Json<JobResponse>),
        (status = 404, description = "Job not found or not public")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_public(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[axum::debug_handler]
pub async fn list_my_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let jobs = state
        .job_service
        .list_for_recruiter(claims.user_id()?)
        .await?;
    let items: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from).collect();
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job posted", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload or missing coordinates"),
        (status = 409, description = "Create the company profile first")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let recruiter_id = claims.user_id()?;
    let company = state
        .company_service
        .find_by_owner(recruiter_id)
        .await?
        .ok_or_else(|| Error::Conflict("company_required".into()))?;
    let job = state
        .job_service
        .create(recruiter_id, &company, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    patch,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = Json<JobResponse>),
        (status = 403, description = "Job belongs to another recruiter"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let existing = state
        .job_service
        .get_owned(id, claims.user_id()?, claims.is_admin())
        .await?;
    let job = state.job_service.update(&existing, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .get_owned(id, claims.user_id()?, claims.is_admin())
        .await?;
    state.job_service.delete(job.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
