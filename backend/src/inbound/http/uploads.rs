//! Serves stored deal images.
//!
//! ```text
//! GET /uploads/{file}
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use tracing::error;

use crate::domain::Error;
use crate::domain::ports::AssetStoreError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Return the bytes of a stored image.
#[utoipa::path(
    get,
    path = "/uploads/{file}",
    params(("file" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/png"),
        (status = 404, description = "No such file", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "getUpload",
    security([])
)]
#[get("/uploads/{file}")]
pub async fn serve_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let bytes = state.assets.open(&name).await.map_err(|err| match err {
        AssetStoreError::Missing { .. } | AssetStoreError::InvalidReference { .. } => {
            Error::not_found("File not found")
        }
        other => {
            error!(error = %other, "reading stored image failed");
            Error::internal("Failed to read file")
        }
    })?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(&name)))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
