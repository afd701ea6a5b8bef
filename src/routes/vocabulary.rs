use axum::Json;

use crate::vocabulary::{self, VocabularyResponse};

#[axum::debug_handler]
pub async fn get_vocabulary() -> Json<VocabularyResponse> {
    Json(vocabulary::all())
}
