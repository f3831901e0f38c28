//! HTTP handlers for the association protocol
//!
//! These operations orchestrate the association store and the resource
//! registry: existence checks on both edge endpoints, idempotent creation,
//! parallel fan-out resolution of related resources, and grouping of results
//! by relation name.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::Method;
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

use crate::associations::model::{Association, AssociationQuery};
use crate::core::error::ApiError;
use crate::core::filter::filter_resource;
use crate::core::hypermedia::{append_links, self_link_type};
use crate::core::store::StoreError;
use crate::server::{AppState, parse_resource_id, store_failure};

/// A reference to a related entity extracted from a request payload
#[derive(Debug)]
struct RelatedRef {
    kind: String,
    id: i64,
}

impl RelatedRef {
    /// Pull the declared kind and id out of one payload entry.
    ///
    /// The kind comes from the entry's own self-link metadata
    /// (`_links.self.type`); an entry without it, or without a numeric id, is
    /// malformed and fails the whole batch.
    fn from_payload(entry: &Value) -> Result<Self, ApiError> {
        let id = entry.get("id").and_then(Value::as_i64);
        let kind = self_link_type(entry);

        match (kind, id) {
            (Some(kind), Some(id)) => Ok(Self {
                kind: kind.to_string(),
                id,
            }),
            _ => {
                tracing::info!(payload = %entry, "malformed association payload from client");
                Err(ApiError::invalid_content(
                    "association entries need an id and _links.self.type",
                ))
            }
        }
    }
}

/// Create one or more associations.
///
/// `POST /{kind}/{id}/associate/{relation}` with a body of one related-entity
/// reference or an array of them.
///
/// Requested entities already associated under this relation are treated as
/// satisfied: a request containing only those returns 200 with the existing
/// association set rather than an error. New entities are existence-checked
/// in their own stores and written in a parallel fan-out — a failure partway
/// does not roll back rows already written; since re-sending the same batch
/// skips existing rows, a client retry converges.
pub async fn create_associations(
    State(state): State<AppState>,
    Path((kind, raw_id, relation)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<IndexMap<String, Vec<Value>>>, ApiError> {
    state.check_access(
        &Method::POST,
        &kind,
        raw_id.parse().ok(),
        Some(&relation),
    )?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;

    let requested = match body {
        Value::Array(items) => items,
        single => vec![single],
    };
    if requested.is_empty() {
        return Err(ApiError::invalid_content("association payload is empty"));
    }

    // malformed input fails the whole batch before anything is written
    let refs = requested
        .iter()
        .map(RelatedRef::from_payload)
        .collect::<Result<Vec<_>, _>>()?;

    let query = AssociationQuery::for_base(kind.as_str(), id).relation(relation.as_str());
    let (_base, existing) = tokio::try_join!(
        async {
            entry
                .store
                .get(id)
                .await
                .map_err(|err| store_failure(&kind, Some(id), "get", err))
        },
        async {
            state
                .associations
                .find(&query)
                .await
                .map_err(|err| association_failure(&query, "find", err))
        },
    )?;

    let existing_ids: HashSet<i64> = existing.iter().map(|row| row.related_id).collect();
    let fresh: Vec<&RelatedRef> = refs
        .iter()
        .filter(|reference| !existing_ids.contains(&reference.id))
        .collect();

    if fresh.is_empty() {
        tracing::info!(%kind, id, %relation, "requested associations already exist");
        let resolved = try_join_all(existing.iter().map(|row| resolve_row(&state, row))).await?;

        let mut grouped = IndexMap::new();
        grouped.insert(
            relation.clone(),
            resolved.into_iter().map(|(_, item)| item).collect(),
        );
        return Ok(Json(grouped));
    }

    // parallel fan-out; completed writes stay if a later one fails
    try_join_all(
        fresh
            .iter()
            .map(|reference| associate_one(&state, &kind, id, &relation, reference)),
    )
    .await?;

    tracing::info!(%kind, id, %relation, count = fresh.len(), "associations created");

    // respond with the full requested set, resolved from the stores
    let rendered = try_join_all(refs.iter().map(|reference| resolve_ref(&state, reference))).await?;

    let mut grouped = IndexMap::new();
    grouped.insert(relation.clone(), rendered);
    Ok(Json(grouped))
}

/// List every association of a resource, grouped by relation name.
///
/// `GET /{kind}/{id}/associations`
///
/// A resource with no associations yields `200 {}` — an empty relation set
/// is a valid state, not an error. Every row is resolved to its current
/// related resource; a row that cannot be resolved (endpoint deleted
/// out-of-band) fails the request rather than being silently dropped.
pub async fn list_associations(
    State(state): State<AppState>,
    Path((kind, raw_id)): Path<(String, String)>,
) -> Result<Json<IndexMap<String, Vec<Value>>>, ApiError> {
    state.check_access(&Method::GET, &kind, raw_id.parse().ok(), None)?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    let query = AssociationQuery::for_base(kind.as_str(), id);
    let rows = state
        .associations
        .find(&query)
        .await
        .map_err(|err| association_failure(&query, "find", err))?;

    if rows.is_empty() {
        tracing::info!(%kind, id, "no associations found");
        return Ok(Json(IndexMap::new()));
    }

    let resolved = try_join_all(rows.iter().map(|row| resolve_row(&state, row))).await?;

    let mut grouped: IndexMap<String, Vec<Value>> = IndexMap::new();
    for (relation, item) in resolved {
        grouped.entry(relation).or_default().push(item);
    }

    Ok(Json(grouped))
}

/// Remove one association.
///
/// `DELETE /{kind}/{id}/associate/{relation}/{relatedId}`
///
/// Removing an association that was never created is a 404. All rows
/// matching the (base, relation, related) triple are removed — normally
/// exactly one.
pub async fn remove_association(
    State(state): State<AppState>,
    Path((kind, raw_id, relation, raw_related)): Path<(String, String, String, String)>,
) -> Result<Json<&'static str>, ApiError> {
    state.check_access(
        &Method::DELETE,
        &kind,
        raw_id.parse().ok(),
        Some(&relation),
    )?;
    let entry = state.kind(&kind)?;
    let id = parse_resource_id(&kind, &raw_id)?;
    let related_id = parse_resource_id(&kind, &raw_related)?;

    entry
        .store
        .get(id)
        .await
        .map_err(|err| store_failure(&kind, Some(id), "get", err))?;

    let query = AssociationQuery::for_base(kind.as_str(), id)
        .relation(relation.as_str())
        .related(related_id);

    let rows = state
        .associations
        .find(&query)
        .await
        .map_err(|err| association_failure(&query, "find", err))?;

    if rows.is_empty() {
        tracing::info!(%kind, id, %relation, related_id, "trying to delete a non-existing association");
        return Err(ApiError::AssociationNotFound {
            relation,
            related_id,
        });
    }

    state
        .associations
        .remove(&query)
        .await
        .map_err(|err| association_failure(&query, "remove", err))?;

    tracing::info!(%kind, id, %relation, related_id, "association removed");
    Ok(Json("OK"))
}

/// Existence-check one requested entity and write its edge row.
///
/// The payload's kind tag is validated against the live registry before
/// anything touches the association store; the related entity itself must
/// already exist in its own store.
async fn associate_one(
    state: &AppState,
    base_kind: &str,
    base_id: i64,
    relation: &str,
    reference: &RelatedRef,
) -> Result<(), ApiError> {
    let Some(entry) = state.registry.kind(&reference.kind) else {
        tracing::info!(kind = %reference.kind, "association payload references an unregistered kind");
        return Err(ApiError::invalid_content(format!(
            "unknown resource kind '{}'",
            reference.kind
        )));
    };

    match entry.store.get(reference.id).await {
        Ok(_) => {}
        Err(StoreError::NotFound) => {
            tracing::info!(
                kind = %reference.kind,
                id = reference.id,
                "trying to associate a non-existing entity"
            );
            return Err(ApiError::RelatedNotCreated {
                kind: reference.kind.clone(),
                id: reference.id,
            });
        }
        Err(err) => {
            tracing::error!(kind = %reference.kind, id = reference.id, error = %err, "could not get related entity");
            return Err(ApiError::Internal);
        }
    }

    let row = Association::new(
        base_kind,
        base_id,
        relation,
        reference.kind.as_str(),
        reference.id,
    );
    let query = AssociationQuery::for_base(base_kind, base_id);
    state
        .associations
        .create(row)
        .await
        .map_err(|err| association_failure(&query, "create", err))?;

    Ok(())
}

/// Resolve a stored association row to its filtered, linked related resource
async fn resolve_row(state: &AppState, row: &Association) -> Result<(String, Value), ApiError> {
    let Some(entry) = state.registry.kind(&row.related_type) else {
        tracing::error!(
            related_type = %row.related_type,
            related_id = row.related_id,
            "association row references an unregistered kind"
        );
        return Err(ApiError::Internal);
    };

    let instance = entry.store.get(row.related_id).await.map_err(|err| {
        tracing::error!(
            kind = %row.related_type,
            id = row.related_id,
            error = %err,
            "could not resolve related resource"
        );
        ApiError::Internal
    })?;

    let mut filtered = filter_resource(entry.store.fields(), state.soft_field(), &instance);
    append_links(&mut filtered, &row.related_type, &state.config.api_base);
    Ok((row.relation_name.clone(), filtered))
}

/// Resolve a payload reference to its filtered, linked resource
async fn resolve_ref(state: &AppState, reference: &RelatedRef) -> Result<Value, ApiError> {
    let entry = state.kind(&reference.kind)?;

    let instance = entry.store.get(reference.id).await.map_err(|err| {
        tracing::error!(kind = %reference.kind, id = reference.id, error = %err, "could not resolve requested entity");
        ApiError::Internal
    })?;

    let mut filtered = filter_resource(entry.store.fields(), state.soft_field(), &instance);
    append_links(&mut filtered, &reference.kind, &state.config.api_base);
    Ok(filtered)
}

fn association_failure(query: &AssociationQuery, operation: &str, err: StoreError) -> ApiError {
    tracing::error!(?query, operation, error = %err, "association store failure");
    ApiError::Internal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_related_ref_from_valid_payload() {
        let entry = json!({
            "id": 4,
            "name": "widget",
            "_links": {"self": {"href": "/api/foo/4", "type": "foo"}},
        });

        let reference = RelatedRef::from_payload(&entry).unwrap();
        assert_eq!(reference.kind, "foo");
        assert_eq!(reference.id, 4);
    }

    #[test]
    fn test_related_ref_missing_links_is_invalid() {
        let entry = json!({"id": 4, "name": "widget"});
        let err = RelatedRef::from_payload(&entry).unwrap_err();
        assert!(matches!(err, ApiError::InvalidContent { .. }));
    }

    #[test]
    fn test_related_ref_missing_id_is_invalid() {
        let entry = json!({
            "name": "widget",
            "_links": {"self": {"type": "foo"}},
        });
        let err = RelatedRef::from_payload(&entry).unwrap_err();
        assert!(matches!(err, ApiError::InvalidContent { .. }));
    }

    #[test]
    fn test_related_ref_non_numeric_id_is_invalid() {
        let entry = json!({
            "id": "four",
            "_links": {"self": {"type": "foo"}},
        });
        assert!(RelatedRef::from_payload(&entry).is_err());
    }
}
