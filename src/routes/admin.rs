use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use sqlx::types::ipnetwork::IpNetwork;
use std::net::IpAddr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::get_config,
    dto::{
        admin_dto::{
            AdminListQuery, AdminUpdateCompanyPayload, AdminUpdateJobPayload,
            AdminUpdateUserPayload, AuditLogQuery, ConfirmQuery,
        },
        auth_dto::UserResponse,
        company_dto::CompanyResponse,
        job_dto::JobResponse,
    },
    error::{Error, Result},
    listing::paginate,
    middleware::auth::Claims,
    services::{audit_service::AuditEntry, export_service::ExportService},
    AppState,
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// First hop of `X-Forwarded-For`, else `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<IpNetwork> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    let real = headers.get("x-real-ip").and_then(|v| v.to_str().ok());
    forwarded
        .or(real)
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
        .map(IpNetwork::from)
}

fn require_confirmation(query: &ConfirmQuery) -> Result<()> {
    if !query.confirmed() {
        return Err(Error::BadRequest("confirmation_required".into()));
    }
    Ok(())
}

fn entry(
    action: &'static str,
    entity_type: &'static str,
    entity_id: Uuid,
    claims: &Claims,
    query: &ConfirmQuery,
    headers: &HeaderMap,
) -> AuditEntry {
    AuditEntry {
        action,
        entity_type,
        entity_id,
        actor_id: claims.user_id().ok(),
        reason: query.reason(),
        ip: client_ip(headers),
        ..AuditEntry::default()
    }
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list().await?;
    let page = paginate(users, query.page.unwrap_or(1), get_config().listing_page_size)
        .map(UserResponse::from);
    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
    Json(payload): Json<AdminUpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let changes = json!({ "name": payload.name, "role": payload.role });
    let user = state.user_service.admin_update(id, payload).await?;
    state
        .audit_service
        .record(AuditEntry {
            metadata: Some(changes),
            ..entry("user.update", "user", id, &claims, &confirm, &headers)
        })
        .await;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse> {
    require_confirmation(&confirm)?;
    if claims.user_id()? == id {
        return Err(Error::BadRequest("cannot_delete_self".into()));
    }
    state.user_service.delete(id).await?;
    state
        .audit_service
        .record(entry("user.delete", "user", id, &claims, &confirm, &headers))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let companies = state.company_service.list(false).await?;
    let page = paginate(companies, query.page.unwrap_or(1), get_config().listing_page_size)
        .map(CompanyResponse::from);
    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn update_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
    Json(payload): Json<AdminUpdateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let changes = json!({ "name": payload.name, "featured": payload.featured });
    let company = state.company_service.admin_update(id, payload).await?;
    state
        .audit_service
        .record(AuditEntry {
            metadata: Some(changes),
            ..entry("company.update", "company", id, &claims, &confirm, &headers)
        })
        .await;
    Ok(Json(CompanyResponse::from(company)))
}

#[axum::debug_handler]
pub async fn delete_company(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse> {
    require_confirmation(&confirm)?;
    state.company_service.delete(id).await?;
    state
        .audit_service
        .record(entry("company.delete", "company", id, &claims, &confirm, &headers))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Every job including drafts and spam.
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_all().await?;
    let page = paginate(jobs, query.page.unwrap_or(1), get_config().listing_page_size)
        .map(JobResponse::from);
    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
    Json(payload): Json<AdminUpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let changes = json!({
        "featured": payload.featured,
        "published": payload.published,
        "spam": payload.spam,
    });
    let job = state.job_service.admin_update(id, payload).await?;
    state
        .audit_service
        .record(AuditEntry {
            metadata: Some(changes),
            ..entry("job.update", "job", id, &claims, &confirm, &headers)
        })
        .await;
    Ok(Json(JobResponse::from(job)))
}

#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse> {
    require_confirmation(&confirm)?;
    state.job_service.delete(id).await?;
    state
        .audit_service
        .record(entry("job.delete", "job", id, &claims, &confirm, &headers))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .audit_service
        .list(
            query.entity_type.as_deref(),
            query.page.unwrap_or(1),
            get_config().listing_page_size,
        )
        .await?;
    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn export_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse> {
    let logs = state.audit_service.all(query.entity_type.as_deref()).await?;
    let buffer = ExportService::audit_logs_xlsx(&logs)?;
    let disposition = format!(
        "attachment; filename=\"audit_log_{}.xlsx\"",
        chrono::Utc::now().format("%Y%m%d")
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(
            client_ip(&headers).map(|ip| ip.ip().to_string()).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn client_ip_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        assert!(client_ip(&headers).is_none());
        assert!(client_ip(&HeaderMap::new()).is_none());
    }

    #[test]
    fn destructive_calls_need_confirmation() {
        assert!(matches!(
            require_confirmation(&ConfirmQuery::default()),
            Err(Error::BadRequest(_))
        ));
        let confirmed = ConfirmQuery {
            confirm: Some(true),
            reason: Some("  spam wave ".into()),
        };
        assert!(require_confirmation(&confirmed).is_ok());
        assert_eq!(confirmed.reason().as_deref(), Some("spam wave"));
    }
}
