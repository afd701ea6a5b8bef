use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json},
};
use bytes::Bytes;

use crate::{
    dto::upload_dto::{LogoUploadResponse, UploadResponse},
    error::{Error, Result},
    services::upload_service::{UploadService, UploadTarget},
    AppState,
};

#[derive(Debug, Default)]
struct UploadForm {
    existing: Vec<String>,
    pictures: Vec<(Option<String>, Bytes)>,
    logo: Option<(Option<String>, Bytes)>,
}

/// Reads the whole form first so `existing` fields count towards the cap no
/// matter where they appear.
async fn read_form(multipart: &mut Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "existing" => {
                let url = field.text().await?;
                let url = url.trim();
                if !url.is_empty() {
                    form.existing.push(url.to_string());
                }
            }
            "pictures" | "logo" => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                if name == "logo" {
                    if form.logo.is_some() {
                        return Err(Error::BadRequest("Only one logo can be uploaded".into()));
                    }
                    form.logo = Some((content_type, data));
                } else {
                    form.pictures.push((content_type, data));
                }
            }
            other => tracing::debug!(field = %other, "ignoring unknown upload field"),
        }
    }
    Ok(form)
}

async fn publish_pictures(service: &UploadService, target: UploadTarget, form: UploadForm) -> Result<UploadResponse> {
    if form.logo.is_some() {
        return Err(Error::BadRequest("Logo uploads go to the company upload".into()));
    }
    if form.pictures.is_empty() {
        return Err(Error::BadRequest("No pictures provided".into()));
    }
    let mut draft = service.draft(target, form.existing);
    for (content_type, data) in &form.pictures {
        draft.stage(content_type.as_deref(), data).await?;
    }
    let (_, added) = draft.commit().await?;
    tracing::info!(upload = ?target, count = added.len(), "pictures uploaded");
    Ok(UploadResponse { paths: added })
}

#[axum::debug_handler]
pub async fn upload_company_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = read_form(&mut multipart).await?;
    let Some((content_type, data)) = form.logo.take() else {
        let response = publish_pictures(&state.upload_service, UploadTarget::Company, form).await?;
        return Ok(Json(response).into_response());
    };
    if !form.pictures.is_empty() {
        return Err(Error::BadRequest(
            "Upload the logo and pictures separately".into(),
        ));
    }
    let mut draft = state.upload_service.draft(UploadTarget::CompanyLogo, Vec::new());
    draft.stage(content_type.as_deref(), &data).await?;
    let (_, added) = draft.commit().await?;
    let url = added
        .into_iter()
        .next()
        .ok_or_else(|| Error::Internal("logo upload produced no file".into()))?;
    Ok(Json(LogoUploadResponse { url }).into_response())
}

#[axum::debug_handler]
pub async fn upload_job_pictures(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = read_form(&mut multipart).await?;
    let response = publish_pictures(&state.upload_service, UploadTarget::Job, form).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn upload_cv_pictures(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = read_form(&mut multipart).await?;
    let response = publish_pictures(&state.upload_service, UploadTarget::Cv, form).await?;
    Ok(Json(response))
}
