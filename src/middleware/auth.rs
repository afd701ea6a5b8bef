use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::models::user::Role;
use crate::utils::cookies::{read_cookie, SESSION_COOKIE};
use crate::utils::token::decode_session_token;

pub use crate::utils::token::Claims;

/// Session token from the `session` cookie, falling back to a Bearer header.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = read_cookie(headers, SESSION_COOKIE).filter(|t| !t.is_empty()) {
        return Some(token);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

/// Admins pass every role gate. An empty `allowed` list only requires a
/// valid session.
async fn authorize(mut req: Request, next: Next, allowed: &[Role]) -> Response {
    let Some(token) = session_token(req.headers()) else {
        return reject(StatusCode::UNAUTHORIZED, "not_logged_in");
    };
    let claims = match decode_session_token(token) {
        Ok(claims) => claims,
        Err(_) => return reject(StatusCode::UNAUTHORIZED, "invalid_token"),
    };
    let Some(role) = claims.role() else {
        return reject(StatusCode::UNAUTHORIZED, "invalid_token");
    };
    if !allowed.is_empty() && role != Role::Admin && !allowed.contains(&role) {
        return reject(StatusCode::FORBIDDEN, "forbidden");
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}

pub async fn require_session(req: Request, next: Next) -> Response {
    authorize(req, next, &[]).await
}

pub async fn require_recruiter(req: Request, next: Next) -> Response {
    authorize(req, next, &[Role::Recruiter]).await
}

pub async fn require_job_seeker(req: Request, next: Next) -> Response {
    authorize(req, next, &[Role::JobSeeker]).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    authorize(req, next, &[Role::Admin]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&headers), Some("from-cookie"));
    }

    #[test]
    fn falls_back_to_bearer_and_ignores_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(session_token(&headers), Some("tok"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(session_token(&headers), None);
    }
}
