pub mod account;
pub mod admin;
pub mod applications;
pub mod auth;
pub mod candidates;
pub mod companies;
pub mod cv;
pub mod geocode;
pub mod health;
pub mod jobs;
pub mod saved_searches;
pub mod uploads;
pub mod vocabulary;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::get_config;
use crate::middleware::{
    auth::{require_admin, require_job_seeker, require_recruiter, require_session},
    cors::cors_layer,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::services::upload_service::PUBLIC_PREFIX;
use crate::AppState;

const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// The whole HTTP surface. Role gates sit on `route_layer` so unknown paths
/// still fall through to 404.
pub fn router(state: AppState) -> Router {
    let config = get_config();

    let public_api = Router::new()
        .route("/api/jobs-list", get(jobs::list_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/companies-list", get(companies::list_companies))
        .route("/api/companies/:id", get(companies::get_company))
        .route("/api/geocode/search", get(geocode::search))
        .route("/api/geocode", post(geocode::geocode))
        .route("/api/vocabulary", get(vocabulary::get_vocabulary))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/account/cookie-consent",
            get(account::get_cookie_consent).put(account::put_cookie_consent),
        )
        .layer(from_fn_with_state(
            RateLimiter::per_second(config.public_rps),
            rps_middleware,
        ));

    let session_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/account",
            patch(account::update_account).delete(account::delete_account),
        )
        .route("/api/applications/:id", patch(applications::update_application))
        .route_layer(from_fn(require_session));

    let recruiter_api = Router::new()
        .route(
            "/api/company",
            get(companies::get_own_company)
                .post(companies::create_company)
                .patch(companies::update_company),
        )
        .route("/api/company/upload", post(uploads::upload_company_media))
        .route("/api/jobs", post(jobs::create_job))
        .route("/api/jobs/mine", get(jobs::list_my_jobs))
        .route("/api/jobs/upload", post(uploads::upload_job_pictures))
        .route(
            "/api/jobs/:id",
            patch(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/api/jobs/:id/applications", get(applications::list_for_job))
        .route("/api/candidates-list", get(candidates::list_candidates))
        .route("/api/candidates/:id", get(candidates::get_candidate))
        .route_layer(from_fn(require_recruiter));

    let job_seeker_api = Router::new()
        .route(
            "/api/cv",
            get(cv::get_cv)
                .post(cv::create_cv)
                .patch(cv::update_cv)
                .delete(cv::delete_cv),
        )
        .route("/api/cv/upload", post(uploads::upload_cv_pictures))
        .route("/api/applications", post(applications::apply))
        .route("/api/applications/mine", get(applications::list_my_applications))
        .route("/api/applications/:id/withdraw", post(applications::withdraw))
        .route(
            "/api/saved-searches",
            get(saved_searches::list_saved_searches).post(saved_searches::create_saved_search),
        )
        .route(
            "/api/saved-searches/:id",
            patch(saved_searches::update_saved_search)
                .delete(saved_searches::delete_saved_search),
        )
        .route(
            "/api/saved-searches/:id/matches",
            get(saved_searches::saved_search_matches),
        )
        .route_layer(from_fn(require_job_seeker));

    let admin_api = Router::new()
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/:id",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/api/admin/companies", get(admin::list_companies))
        .route(
            "/api/admin/companies/:id",
            patch(admin::update_company).delete(admin::delete_company),
        )
        .route("/api/admin/jobs", get(admin::list_jobs))
        .route(
            "/api/admin/jobs/:id",
            patch(admin::update_job).delete(admin::delete_job),
        )
        .route("/api/admin/audit-logs", get(admin::list_audit_logs))
        .route("/api/admin/audit-logs/export", get(admin::export_audit_logs))
        .route_layer(from_fn(require_admin));

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(session_api)
        .merge(recruiter_api)
        .merge(job_seeker_api)
        .merge(admin_api)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(cors_layer(config.allowed_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
