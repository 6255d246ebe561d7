//! Request handlers for the three API operations.

use super::{ApiError, AppState};
use crate::output::{attachment_filename, render_export};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use mongo_exporter_core::error::ExportError;
use mongo_exporter_core::{
    CollectionSummary, ConnectionTarget, DatabaseSummary, ExportRequest,
    MISSING_DATABASE_MESSAGE, MISSING_URL_MESSAGE,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Body of `connect`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    /// Connection string
    pub mongo_url: Option<String>,
}

/// Body of `list-collections`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCollectionsRequest {
    /// Connection string
    pub mongo_url: Option<String>,
    /// Database to enumerate
    pub database: Option<String>,
}

/// Body of `export-data`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDataRequest {
    /// Connection string
    pub mongo_url: Option<String>,
    /// Database to export from
    pub database: Option<String>,
    /// Collections to export; all when absent or empty
    pub collections: Option<Vec<String>>,
}

/// Successful `connect` response.
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// Always `true`
    pub success: bool,
    /// Non-system databases in listing order
    pub databases: Vec<DatabaseSummary>,
}

/// Successful `list-collections` response.
#[derive(Debug, Serialize)]
pub struct ListCollectionsResponse {
    /// Always `true`
    pub success: bool,
    /// Collections in listing order
    pub collections: Vec<CollectionSummary>,
}

/// Parses a request body; an empty body is treated as `{}`.
///
/// The body is read as JSON whatever the `Content-Type` header says.
fn parse_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected malformed request body: {}", e);
        ApiError(ExportError::validation(format!("Invalid JSON body: {}", e)))
    })
}

/// Non-blank value of an optional field.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Target and database for the operations that need both.
fn target_and_database(
    mongo_url: Option<String>,
    database: Option<String>,
) -> Result<(ConnectionTarget, String), ApiError> {
    match (present(mongo_url), present(database)) {
        (Some(url), Some(database)) => Ok((ConnectionTarget::new(url)?, database)),
        _ => Err(ApiError(ExportError::validation(MISSING_DATABASE_MESSAGE))),
    }
}

/// POST connect: lists non-system databases.
pub async fn connect(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: ConnectRequest = parse_body(&body)?;
    let url = present(request.mongo_url)
        .ok_or_else(|| ApiError(ExportError::validation(MISSING_URL_MESSAGE)))?;
    let target = ConnectionTarget::new(url)?;

    let databases = state.engine.probe(&target).await?;
    Ok(Json(ConnectResponse {
        success: true,
        databases,
    })
    .into_response())
}

/// POST list-collections: lists collections with document counts.
pub async fn list_collections(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ListCollectionsRequest = parse_body(&body)?;
    let (target, database) = target_and_database(request.mongo_url, request.database)?;

    let collections = state.engine.list_collections(&target, &database).await?;
    Ok(Json(ListCollectionsResponse {
        success: true,
        collections,
    })
    .into_response())
}

/// POST export-data: exports collections as a downloadable JSON document.
pub async fn export_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ExportDataRequest = parse_body(&body)?;
    let (target, database) = target_and_database(request.mongo_url, request.database)?;

    let export_request = ExportRequest::new(database, request.collections);
    let payload = state
        .engine
        .export_collections(&target, &export_request)
        .await?;
    let rendered = render_export(&payload)?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        attachment_filename(&payload.database)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"export.json\""));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_empty_is_default() {
        let request: ExportDataRequest = parse_body(&Bytes::from_static(b"  \n")).unwrap();
        assert!(request.mongo_url.is_none());
        assert!(request.collections.is_none());
    }

    #[test]
    fn test_parse_body_null_collections() {
        let request: ExportDataRequest = parse_body(&Bytes::from_static(
            br#"{"mongoUrl":"mongodb://h","database":"shop","collections":null}"#,
        ))
        .unwrap();
        assert_eq!(request.database.as_deref(), Some("shop"));
        assert!(request.collections.is_none());
    }

    #[test]
    fn test_parse_body_malformed_is_validation() {
        let error = parse_body::<ConnectRequest>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(error.0.is_validation());
    }

    #[test]
    fn test_target_and_database_requires_both() {
        let cases = [
            (None, Some("shop".to_string())),
            (Some("mongodb://h".to_string()), None),
            (Some(" ".to_string()), Some("shop".to_string())),
            (Some("mongodb://h".to_string()), Some(String::new())),
        ];

        for (url, database) in cases {
            let error = target_and_database(url, database).unwrap_err();
            assert_eq!(error.0.to_string(), MISSING_DATABASE_MESSAGE);
        }
    }
}
