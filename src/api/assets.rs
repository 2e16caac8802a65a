//! Embedded chat UI assets
//!
//! Falls back to the `ui/` directory on disk so the UI can be edited without
//! a rebuild.

use axum::{
    body::Body,
    extract::Path,
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

const UI_DIR: &str = "ui";

fn asset_response(path: &str, data: Vec<u8>) -> Response<Body> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref().to_string())],
        data,
    )
        .into_response()
}

/// Serve `/assets/*path`, embedded first, then from disk
pub async fn serve_static(Path(path): Path<String>) -> Response<Body> {
    let path = path.trim_start_matches('/');
    if path.split('/').any(|seg| seg == "..") {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    if let Some(content) = Assets::get(path) {
        return asset_response(path, content.data.to_vec());
    }

    let fs_path = PathBuf::from(UI_DIR).join(path);
    if let Ok(content) = tokio::fs::read(&fs_path).await {
        return asset_response(path, content);
    }

    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    if let Some(content) = Assets::get("index.html") {
        return String::from_utf8(content.data.to_vec()).ok();
    }

    std::fs::read_to_string(PathBuf::from(UI_DIR).join("index.html")).ok()
}
