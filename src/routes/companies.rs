use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::company_dto::{CompanyListQuery, CompanyResponse, CreateCompanyPayload, UpdateCompanyPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanyListQuery>,
) -> Result<impl IntoResponse> {
    let companies = state
        .company_service
        .list(query.featured.unwrap_or(false))
        .await?;
    let items: Vec<CompanyResponse> = companies.into_iter().map(CompanyResponse::from).collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Company profile", body = Json<CompanyResponse>),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let company = state.company_service.get(id).await?;
    Ok(Json(CompanyResponse::from(company)))
}

#[axum::debug_handler]
pub async fn get_own_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let company = state.company_service.get_by_owner(claims.user_id()?).await?;
    Ok(Json(CompanyResponse::from(company)))
}

#[utoipa::path(
    post,
    path = "/api/company",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Company created", body = Json<CompanyResponse>),
        (status = 400, description = "Invalid payload or missing coordinates"),
        (status = 409, description = "Recruiter already has a company")
    )
)]
#[axum::debug_handler]
pub async fn create_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state
        .company_service
        .create(claims.user_id()?, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(CompanyResponse::from(company))))
}

#[utoipa::path(
    patch,
    path = "/api/company",
    request_body = UpdateCompanyPayload,
    responses(
        (status = 200, description = "Company updated", body = Json<CompanyResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Recruiter has no company yet")
    )
)]
#[axum::debug_handler]
pub async fn update_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state
        .company_service
        .update(claims.user_id()?, payload)
        .await?;
    Ok(Json(CompanyResponse::from(company)))
}
