//! Handlers for pre-wired named relations
//!
//! Where the association subsystem works on free-form relation names over a
//! join table, these routes serve relations a kind has explicitly declared in
//! its relation table. The verb picks the operation (GET→get, POST→set,
//! DELETE→remove); a relation the table cannot resolve is a 404.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::ApiError;
use crate::core::filter::filter_resource;
use crate::core::relation::{RelationAccessor, RelationVerb};
use crate::core::store::StoreError;
use crate::server::registry::ResourceKind;
use crate::server::{AppState, parse_resource_id, store_failure};

/// `GET /{kind}/{id}/{relation}` — list the related items, filtered with the
/// related kind's field metadata.
pub async fn get_relation(
    State(state): State<AppState>,
    Path((kind, raw_id, relation)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::GET, &kind, raw_id.parse().ok(), Some(&relation))?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;

    let (accessor, related) = resolve_accessor(&state, &entry, &kind, &relation, RelationVerb::Get)?;

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    let items = accessor.get(id).await.map_err(|err| {
        tracing::error!(%kind, id, %relation, error = %err, "unable to list relations that should exist");
        ApiError::Internal
    })?;

    let filtered: Vec<Value> = items
        .iter()
        .map(|item| filter_resource(related.store.fields(), state.soft_field(), item))
        .collect();

    Ok(Json(filtered).into_response())
}

/// `GET /{kind}/{id}/{relation}/{relatedId}` — one item out of the relation
/// set; not being in the set reads as 404.
pub async fn get_relation_item(
    State(state): State<AppState>,
    Path((kind, raw_id, relation, raw_related)): Path<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::GET, &kind, raw_id.parse().ok(), Some(&relation))?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;
    let related_id = parse_resource_id(&kind, &raw_related)?;

    let (accessor, related) = resolve_accessor(&state, &entry, &kind, &relation, RelationVerb::Get)?;

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    let items = accessor.get(id).await.map_err(|err| {
        tracing::error!(%kind, id, %relation, error = %err, "unable to list relations that should exist");
        ApiError::Internal
    })?;

    let item = items
        .iter()
        .find(|item| item.get("id").and_then(Value::as_i64) == Some(related_id))
        .ok_or_else(|| {
            tracing::info!(%kind, id, %relation, related_id, "item not in relation set");
            ApiError::ResourceNotFound {
                kind: related.name.clone(),
                id: Some(related_id),
            }
        })?;

    Ok(Json(filter_resource(related.store.fields(), state.soft_field(), item)).into_response())
}

/// `POST /{kind}/{id}/{relation}` — attach the entity referenced by the body
/// and answer 201 with it, filtered.
pub async fn add_relation(
    State(state): State<AppState>,
    Path((kind, raw_id, relation)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::POST, &kind, raw_id.parse().ok(), Some(&relation))?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;

    let (accessor, related) = resolve_accessor(&state, &entry, &kind, &relation, RelationVerb::Set)?;

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    let related_id = body
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::invalid_content("relation content needs an id"))?;

    let instance = related
        .store
        .get(related_id)
        .await
        .map_err(|err| store_failure(&related.name, Some(related_id), "get", err))?;

    accessor.set(id, &instance).await.map_err(|err| {
        tracing::error!(%kind, id, %relation, related_id, error = %err, "cannot save relation");
        ApiError::Internal
    })?;

    tracing::info!(%kind, id, %relation, related_id, "relation added");
    let filtered = filter_resource(related.store.fields(), state.soft_field(), &instance);
    Ok((StatusCode::CREATED, Json(filtered)).into_response())
}

/// `DELETE /{kind}/{id}/{relation}/{relatedId}` — detach one related item.
pub async fn remove_relation(
    State(state): State<AppState>,
    Path((kind, raw_id, relation, raw_related)): Path<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::DELETE, &kind, raw_id.parse().ok(), Some(&relation))?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;
    let related_id = parse_resource_id(&kind, &raw_related)?;

    let (accessor, _related) =
        resolve_accessor(&state, &entry, &kind, &relation, RelationVerb::Remove)?;

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    match accessor.remove(id, related_id).await {
        Ok(()) => {
            tracing::info!(%kind, id, %relation, related_id, "relation removed");
            Ok(Json("OK").into_response())
        }
        Err(StoreError::NotFound) => {
            tracing::info!(%kind, id, %relation, related_id, "relation entry does not exist");
            Err(ApiError::AssociationNotFound {
                relation,
                related_id,
            })
        }
        Err(err) => {
            tracing::error!(%kind, id, %relation, related_id, error = %err, "unable to remove relation");
            Err(ApiError::Internal)
        }
    }
}

/// `DELETE /{kind}/{id}/{relation}` — a detach without a related id cannot
/// name an entry; 404.
pub async fn remove_relation_without_id(
    State(state): State<AppState>,
    Path((kind, raw_id, relation)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    state.check_access(&Method::DELETE, &kind, raw_id.parse().ok(), Some(&relation))?;
    tracing::info!(%kind, %relation, "no relation id given to remove");
    Err(ApiError::RelationNotFound { kind, relation })
}

/// Resolve verb + relation on the kind's table, along with the related
/// kind's registry entry. Either missing reads as "relation does not exist".
fn resolve_accessor(
    state: &AppState,
    entry: &ResourceKind,
    kind: &str,
    relation: &str,
    verb: RelationVerb,
) -> Result<(Arc<dyn RelationAccessor>, Arc<ResourceKind>), ApiError> {
    let not_found = || {
        tracing::info!(kind, relation, "trying to access a non-existing relationship");
        ApiError::RelationNotFound {
            kind: kind.to_string(),
            relation: relation.to_string(),
        }
    };

    let accessor = entry.relations.resolve(verb, relation).ok_or_else(not_found)?;
    let related = state
        .registry
        .kind(accessor.related_kind())
        .ok_or_else(not_found)?;

    Ok((accessor, related))
}
