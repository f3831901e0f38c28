//! Generic CRUD handlers, shared by every registered resource kind

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use crate::core::error::ApiError;
use crate::core::filter::filter_resource;
use crate::core::hypermedia::append_links;
use crate::core::store::StoreError;
use crate::server::{AppState, parse_resource_id, store_failure};

/// List a kind's resources.
///
/// `GET /{kind}` — soft-deleted rows are always excluded while soft-delete
/// mode is active.
pub async fn list_resources(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::GET, &kind, None, None)?;
    let entry = state.kind(&kind)?;

    let rows = entry
        .store
        .find(&Map::new())
        .await
        .map_err(|err| store_failure(&kind, None, "find", err))?;

    let filtered: Vec<Value> = rows
        .iter()
        .filter(|row| !is_soft_deleted(&state, row))
        .map(|row| filter_resource(entry.store.fields(), state.soft_field(), row))
        .collect();

    tracing::info!(%kind, count = filtered.len(), "listed resources");
    Ok(Json(filtered).into_response())
}

/// Fetch a single resource.
///
/// `GET /{kind}/{id}` — a non-numeric id, a missing row, and a soft-deleted
/// row all read as 404.
pub async fn get_resource(
    State(state): State<AppState>,
    Path((kind, raw_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::GET, &kind, raw_id.parse().ok(), None)?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;

    let mut query = Map::new();
    query.insert("id".to_string(), Value::from(id));

    let rows = entry
        .store
        .find(&query)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "find", err))?;

    let row = rows
        .iter()
        .find(|row| !is_soft_deleted(&state, row))
        .ok_or_else(|| {
            tracing::info!(%kind, id, "no results for query");
            ApiError::ResourceNotFound {
                kind: kind.clone(),
                id: Some(id),
            }
        })?;

    tracing::info!(%kind, id, "got resource");
    Ok(Json(filter_resource(entry.store.fields(), state.soft_field(), row)).into_response())
}

/// Create a resource.
///
/// `POST /{kind}` — a resource matching the full submitted content already
/// existing is a 409. Store validation errors are split: a missing required
/// value maps to the required-field 404, an invalid value to 400, anything
/// else to an opaque 500.
pub async fn create_resource(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::POST, &kind, None, None)?;
    let entry = state.kind(&kind)?;

    let Value::Object(content) = body else {
        return Err(ApiError::invalid_content("expected a JSON object"));
    };

    let duplicates = entry
        .store
        .find(&content)
        .await
        .map_err(|err| store_failure(&kind, None, "find", err))?;

    if !duplicates.is_empty() {
        tracing::info!(%kind, "resource already exists");
        return Err(ApiError::AlreadyExists { kind });
    }

    let created = entry.store.create(content).await.map_err(|err| match err {
        StoreError::MissingValue { field } => {
            tracing::info!(%kind, %field, "required field missing on create");
            ApiError::MissingField { field }
        }
        StoreError::InvalidValue { .. } => {
            tracing::info!(%kind, error = %err, "store rejected submitted content");
            ApiError::invalid_content(err.to_string())
        }
        other => {
            tracing::error!(%kind, error = %other, "could not save resource");
            ApiError::Internal
        }
    })?;

    let filtered = filter_resource(entry.store.fields(), state.soft_field(), &created);
    tracing::info!(%kind, id = created.get("id").and_then(|v| v.as_i64()), "resource created");
    Ok((StatusCode::CREATED, Json(filtered)).into_response())
}

/// Update a resource. PUT and PATCH share this handler.
///
/// `PUT|PATCH /{kind}/{id}` — while soft-delete mode is active, content that
/// sets the delete flag is rejected: deletion goes through DELETE, not a
/// field write. In hard-delete mode there is no flag to protect and the
/// guard is skipped.
pub async fn update_resource(
    State(state): State<AppState>,
    Path((kind, raw_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::PUT, &kind, raw_id.parse().ok(), None)?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;

    let Value::Object(content) = body else {
        return Err(ApiError::invalid_content("expected a JSON object"));
    };

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    if let Some(field) = state.soft_field() {
        if entry.store.has_field(field) && content.get(field) == Some(&Value::Bool(true)) {
            tracing::info!(%kind, id, "trying to delete resource via PUT/PATCH");
            return Err(ApiError::invalid_content("PUT/PATCH may not delete content"));
        }
    }

    let updated = entry
        .store
        .save(id, content)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "save", err))?;

    let mut filtered = filter_resource(entry.store.fields(), state.soft_field(), &updated);
    append_links(&mut filtered, &kind, &state.config.api_base);
    tracing::info!(%kind, id, "resource updated");
    Ok(Json(filtered).into_response())
}

/// Delete a resource.
///
/// `DELETE /{kind}/{id}` — hard mode removes the row; soft mode flags it,
/// provided the kind declares the flag field. A kind with no delete
/// mechanism available reads as 400.
pub async fn delete_resource(
    State(state): State<AppState>,
    Path((kind, raw_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::DELETE, &kind, raw_id.parse().ok(), None)?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    if state.config.delete.is_hard() {
        entry
            .store
            .remove(id)
            .await
            .map_err(|err| store_failure(&kind, Some(id), "remove", err))?;
        tracing::info!(%kind, id, "resource removed");
        return Ok(Json("OK").into_response());
    }

    match state.soft_field() {
        Some(field) if entry.store.has_field(field) => {
            let mut content = Map::new();
            content.insert(field.to_string(), Value::Bool(true));

            entry
                .store
                .save(id, content)
                .await
                .map_err(|err| store_failure(&kind, Some(id), "save", err))?;
            tracing::info!(%kind, id, "resource soft-deleted");
            Ok(Json("OK").into_response())
        }
        _ => {
            tracing::info!(%kind, id, "no delete mechanism available");
            Err(ApiError::invalid_content("Cannot delete resource"))
        }
    }
}

/// Whether a row is hidden by the active soft-delete mode
fn is_soft_deleted(state: &AppState, row: &Value) -> bool {
    match state.soft_field() {
        Some(field) => row.get(field) == Some(&Value::Bool(true)),
        None => false,
    }
}
