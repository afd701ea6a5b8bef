use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::auth_dto::{LoginPayload, RegisterPayload, UserResponse},
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::Role,
    utils::cookies::{expired_session_cookie, session_cookie},
    utils::token::issue_session_token,
    AppState,
};

fn role_of(user: &crate::models::user::User) -> Result<Role> {
    user.role.parse().map_err(Error::Internal)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created and session started", body = Json<UserResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;
    let token = issue_session_token(user.id, role_of(&user)?)?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&token)?)],
        Json(UserResponse::from(user)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session started", body = Json<UserResponse>),
        (status = 401, description = "Wrong email or password")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.authenticate(payload).await?;
    let token = issue_session_token(user.id, role_of(&user)?)?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok((
        [(header::SET_COOKIE, session_cookie(&token)?)],
        Json(UserResponse::from(user)),
    ))
}

#[axum::debug_handler]
pub async fn logout() -> Result<impl IntoResponse> {
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie()?)],
    ))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get(claims.user_id()?).await?;
    Ok(Json(UserResponse::from(user)))
}
