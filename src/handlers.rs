use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use crate::AppState;
use crate::client::GenerationError;
use crate::error::AppError;
use crate::models::{
    GeneratePoemBody, GeneratePoemResponse, GenerationRequest, HealthResponse,
    SavePoemBody, SavePoemResponse
};
use crate::normalize::normalize_line;
use crate::prompt::{build_prompt, estimate_usage};

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {

    let gemini_status = if state.generator.is_configured() { "Configured" } else { "Not configured" };

    Json(HealthResponse {
        status: "Server is running",
        timestamp: Local::now().to_rfc3339(),
        runtime_version: format!(
            "{} {} ({}/{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
        gemini_status,
        ai_provider: state.generator.provider_name().to_string()
    })

}

pub async fn generate_poem(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>
) -> Result<Json<GeneratePoemResponse>, AppError> {

    let value = json_object(body).ok_or(AppError::NoJsonData)?;
    let request = validate_generation(parse_body(value)?)?;

    if !state.generator.is_configured() {
        return Err(GenerationError::NotConfigured.into());
    }

    let prompt = build_prompt(&request);

    info!(theme = %request.theme, input = %request.user_input, "Generating poem line");

    let raw = state.generator.generate(&prompt).await?;
    let line = normalize_line(&raw);

    info!(line = %line, "Generated line");

    let usage = estimate_usage(&prompt, &line);

    Ok(Json(GeneratePoemResponse {
        success: true,
        line,
        usage
    }))

}

pub async fn save_poem(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>
) -> Result<Json<SavePoemResponse>, AppError> {

    let value = json_object(body).ok_or(AppError::EmptyPoem)?;
    let body: SavePoemBody = parse_body(value)?;

    let lines = body.poem.unwrap_or_default();
    if lines.is_empty() {
        return Err(AppError::EmptyPoem);
    }

    let theme = body.theme
        .filter(|theme| !theme.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let filename = state.store
        .save(&theme, &lines, state.generator.provider_name())
        .await
        .map_err(AppError::Save)?;

    Ok(Json(SavePoemResponse {
        success: true,
        filename,
        message: "Poem saved successfully".to_string()
    }))

}

pub async fn download_poem(
    State(state): State<AppState>,
    filename: Result<Path<String>, PathRejection>
) -> Result<Response, AppError> {

    // undecodable names can't exist on disk either
    let Path(filename) = filename.map_err(|e| {
        warn!("Error downloading file: {}", e);
        AppError::FileNotFound
    })?;

    let bytes = state.store
        .read(&filename)
        .await
        .map_err(|e| {
            warn!(filename = %filename, "Error downloading file: {}", e);
            AppError::FileNotFound
        })?;

    // filename already passed validation so it is safe to echo into the header
    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename))
    ];

    Ok((headers, bytes).into_response())

}

// a body only counts as received when it is a non-empty json object
fn json_object(body: Result<Json<Value>, JsonRejection>) -> Option<Value> {

    match body {
        Ok(Json(value)) if value.as_object().is_some_and(|fields| !fields.is_empty()) => Some(value),
        _ => None
    }

}

fn parse_body<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {

    serde_json::from_value(value).map_err(|e| AppError::InvalidBody(e.to_string()))

}

fn validate_generation(body: GeneratePoemBody) -> Result<GenerationRequest, AppError> {

    let theme = body.theme.filter(|t| !t.is_empty());
    let user_input = body.user_input.filter(|u| !u.is_empty());

    match (theme, user_input) {
        (Some(theme), Some(user_input)) => Ok(GenerationRequest {
            theme,
            user_input,
            previous_lines: body.previous_lines.unwrap_or_default()
        }),
        _ => Err(AppError::MissingThemeOrInput)
    }

}
