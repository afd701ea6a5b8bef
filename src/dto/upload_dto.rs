use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    /// Newly published URLs, in upload order.
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoUploadResponse {
    pub url: String,
}
