use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use super::errors::ApiError;
use crate::downloads::content_type_for;
use crate::AppState;

/// `GET /download/:file_name`
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.chat.downloads().read(&file_name).await?;

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&file_name).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];

    Ok((headers, body))
}
