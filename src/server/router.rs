//! Route table construction

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::associations::handlers::{
    create_associations, list_associations, remove_association,
};
use crate::core::error::ApiError;
use crate::resources::handlers::{
    create_resource, delete_resource, get_resource, list_resources, update_resource,
};
use crate::resources::relations::{
    add_relation, get_relation, get_relation_item, remove_relation, remove_relation_without_id,
};
use crate::server::AppState;

/// Build the full route table for one server instance.
///
/// All resource routes are nested under the configured API base:
/// - `GET|POST /{kind}` — list / create
/// - `GET|PUT|PATCH|DELETE /{kind}/{id}` — fetch / update / delete
///   (PATCH has no handler of its own and falls back to PUT's)
/// - `GET /{kind}/{id}/associations` — all associations, grouped
/// - `POST /{kind}/{id}/associate/{relation}` — create association(s)
/// - `DELETE /{kind}/{id}/associate/{relation}/{relatedId}` — remove one
/// - `GET|POST|DELETE /{kind}/{id}/{relation}[/{relatedId}]` — named
///   relations
///
/// A known path hit with an unsupported verb answers 405; axum fills in the
/// `Allow` header from the route's method set. `GET /health` stays outside
/// the API base.
pub fn build_routes(state: AppState) -> Router {
    let api_base = state.config.api_base.clone();

    let api = Router::new()
        .route("/{kind}", get(list_resources).post(create_resource))
        .route(
            "/{kind}/{id}",
            get(get_resource)
                .put(update_resource)
                .patch(update_resource)
                .delete(delete_resource),
        )
        .route("/{kind}/{id}/associations", get(list_associations))
        .route("/{kind}/{id}/associate/{relation}", post(create_associations))
        .route(
            "/{kind}/{id}/associate/{relation}/{related_id}",
            delete(remove_association),
        )
        .route(
            "/{kind}/{id}/{relation}",
            get(get_relation)
                .post(add_relation)
                .delete(remove_relation_without_id),
        )
        .route(
            "/{kind}/{id}/{relation}/{related_id}",
            get(get_relation_item).delete(remove_relation),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    let app = if api_base.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{}", api_base), api)
    };

    app.merge(health_routes()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
