//! Shared test harness for integration tests
//!
//! Builds a server instance with two resource kinds, "foo" and "baz", over
//! the in-memory stores, and keeps direct handles to those stores so tests
//! can inspect physical rows behind the HTTP surface.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod harness;
//! use harness::*;
//! ```

#![allow(dead_code)]

use axum_test::TestServer;
use restforge::prelude::*;

pub struct TestApi {
    pub server: TestServer,
    pub foo_store: InMemoryResourceStore,
    pub baz_store: InMemoryResourceStore,
    pub associations: InMemoryAssociationStore,
}

/// Field metadata shared by both test kinds: a visible id and name, a
/// server-only secret, and a soft-delete flag
pub fn resource_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("id"),
        FieldSpec::new("name").required(),
        FieldSpec::new("secret").server_only(),
        FieldSpec::new("deleted"),
    ]
}

pub fn build_api(config: ApiConfig) -> TestApi {
    build_api_with_policy(config, AllowAll)
}

pub fn build_api_with_policy(config: ApiConfig, policy: impl AccessPolicy + 'static) -> TestApi {
    let foo_store = InMemoryResourceStore::new(resource_fields());
    let baz_store = InMemoryResourceStore::new(resource_fields());
    let associations = InMemoryAssociationStore::new();

    let app = ApiBuilder::new()
        .with_config(config)
        .with_access_policy(policy)
        .with_association_store(associations.clone())
        .register_resource("foo", foo_store.clone())
        .register_resource("baz", baz_store.clone())
        .build()
        .expect("failed to build test app");

    TestApi {
        server: TestServer::new(app),
        foo_store,
        baz_store,
        associations,
    }
}

/// POST a new resource and return its response body
pub async fn create_resource(api: &TestApi, kind: &str, name: &str) -> Value {
    let response = api
        .server
        .post(&format!("/api/{}", kind))
        .json(&json!({"name": name}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

/// Build an association payload entry the way a client would, carrying the
/// self-link metadata the create operation reads the kind tag from
pub fn linked_entry(resource: &Value, kind: &str) -> Value {
    json!({
        "id": resource["id"],
        "_links": {
            "self": {
                "href": format!("/api/{}/{}", kind, resource["id"]),
                "type": kind,
            }
        }
    })
}
