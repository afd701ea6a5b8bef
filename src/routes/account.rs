use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use url::form_urlencoded;
use validator::Validate;

use crate::{
    dto::auth_dto::{CookieConsent, CookieConsentResponse, UpdateAccountPayload, UserResponse},
    error::{Error, Result},
    middleware::auth::Claims,
    services::audit_service::AuditEntry,
    utils::cookies::{build_cookie, expired_session_cookie, read_cookie, CONSENT_COOKIE},
    AppState,
};

const CONSENT_MAX_AGE_SECS: i64 = 365 * 24 * 3600;

/// Stored consent, if the visitor has decided. An unreadable cookie counts as
/// undecided.
fn stored_consent(headers: &HeaderMap) -> Option<CookieConsent> {
    let raw = read_cookie(headers, CONSENT_COOKIE)?;
    let decoded: String = form_urlencoded::parse(format!("v={}", raw).as_bytes())
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())?;
    serde_json::from_str(&decoded).ok()
}

fn encode_consent(consent: &CookieConsent) -> Result<String> {
    let json = serde_json::to_string(consent)?;
    Ok(form_urlencoded::byte_serialize(json.as_bytes()).collect())
}

#[axum::debug_handler]
pub async fn get_cookie_consent(headers: HeaderMap) -> Json<CookieConsentResponse> {
    let stored = stored_consent(&headers);
    Json(CookieConsentResponse {
        decided: stored.is_some(),
        necessary: true,
        consent: stored.unwrap_or_default(),
    })
}

#[axum::debug_handler]
pub async fn put_cookie_consent(Json(consent): Json<CookieConsent>) -> Result<impl IntoResponse> {
    let cookie = build_cookie(
        CONSENT_COOKIE,
        &encode_consent(&consent)?,
        CONSENT_MAX_AGE_SECS,
        false,
    )?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(CookieConsentResponse {
            decided: true,
            necessary: true,
            consent,
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/account",
    request_body = UpdateAccountPayload,
    responses(
        (status = 200, description = "Account updated", body = Json<UserResponse>),
        (status = 401, description = "Not logged in")
    )
)]
#[axum::debug_handler]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateAccountPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .rename(claims.user_id()?, &payload.name)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Deletes the caller's account with everything it owns and ends the session.
#[axum::debug_handler]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    if claims.is_admin() {
        return Err(Error::Forbidden("admin_accounts_cannot_self_delete".into()));
    }
    state.user_service.delete(user_id).await?;
    state
        .audit_service
        .record(AuditEntry {
            action: "account.delete",
            entity_type: "user",
            entity_id: user_id,
            actor_id: Some(user_id),
            ..AuditEntry::default()
        })
        .await;
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie()?)],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn consent_survives_the_cookie_round_trip() {
        let consent = CookieConsent {
            analytics: true,
            marketing: false,
        };
        let encoded = encode_consent(&consent).unwrap();
        assert!(!encoded.contains('"'));
        assert!(!encoded.contains(';'));

        let mut headers = HeaderMap::new();
        let cookie = format!("{}={}", CONSENT_COOKIE, encoded);
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
        assert_eq!(stored_consent(&headers), Some(consent));
    }

    #[test]
    fn garbage_cookie_is_undecided() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("cookie_consent=%7Bnope"));
        assert_eq!(stored_consent(&headers), None);
    }
}
