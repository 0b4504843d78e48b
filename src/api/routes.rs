//! API route handlers

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::server::AppState;
use crate::auth::models::{LoginRequest, LoginResponse, VerifySessionRequest, VerifySessionResponse};
use crate::auth::VerifiedIdentity;
use crate::error::{Error, Result};
use crate::upload::IncomingFile;

/// Multipart field carrying uploaded files
pub const UPLOAD_FIELD: &str = "files";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub image_urls: Vec<String>,
    pub message: String,
}

fn body_error(rejection: JsonRejection) -> Error {
    Error::Validation(rejection.body_text())
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// Admin routes

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = payload.map_err(body_error)?;

    let outcome = state.login.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        outcome,
        message: "Login successful".to_string(),
    }))
}

pub async fn verify_session(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VerifySessionRequest>, JsonRejection>,
) -> Result<Json<VerifySessionResponse>> {
    let Json(req) = payload.map_err(body_error)?;

    state.codec.verify(&req.session_token)?;

    Ok(Json(VerifySessionResponse {
        valid: true,
        message: "Session verification successful".to_string(),
    }))
}

pub async fn upload(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|e| Error::BadRequest(format!("Invalid multipart form: {}", e)))?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Invalid multipart form: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::BadRequest("File field is missing a filename".to_string()))?;

        let content = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(format!("Failed to read '{}': {}", filename, e)))?;

        files.push(IncomingFile { filename, content });
    }

    let image_urls = state.uploads.upload(&identity, files).await?;

    Ok(Json(UploadResponse {
        image_urls,
        message: "Images uploaded successfully".to_string(),
    }))
}
