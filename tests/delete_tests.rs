//! Soft-delete and hard-delete behavior

mod harness;

use harness::*;
use restforge::prelude::*;

#[tokio::test]
async fn test_soft_delete_law() {
    let api = build_api(ApiConfig::default());
    create_resource(&api, "foo", "widget").await;

    let response = api.server.delete("/api/foo/1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let ok: String = response.json();
    assert_eq!(ok, "OK");

    // the API no longer serves it
    let response = api.server.get("/api/foo/1").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // but the row physically exists with its flag set
    assert_eq!(api.foo_store.row_count(), 1);
    let row = api.foo_store.get(1).await.unwrap();
    assert_eq!(row["deleted"], true);
}

#[tokio::test]
async fn test_hard_delete_law() {
    let api = build_api(ApiConfig::default().hard_delete());
    create_resource(&api, "foo", "widget").await;

    let response = api.server.delete("/api/foo/1").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // the row is physically gone
    assert_eq!(api.foo_store.row_count(), 0);
    assert!(matches!(api.foo_store.get(1).await, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_soft_deleted_rows_are_excluded_from_lists() {
    let api = build_api(ApiConfig::default());
    create_resource(&api, "foo", "keep").await;
    create_resource(&api, "foo", "drop").await;

    api.server.delete("/api/foo/2").await;

    let response = api.server.get("/api/foo").await;
    let body: Vec<Value> = response.json();

    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["name"], "keep");
}

#[tokio::test]
async fn test_delete_missing_resource_is_404() {
    let api = build_api(ApiConfig::default());

    let response = api.server.delete("/api/foo/9").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_kind_without_delete_mechanism_is_400() {
    // a kind that declares no soft-delete field, under soft-delete mode
    let store = InMemoryResourceStore::new(vec![
        FieldSpec::new("id"),
        FieldSpec::new("name").required(),
    ]);

    let app = ApiBuilder::new()
        .with_association_store(InMemoryAssociationStore::new())
        .register_resource("note", store)
        .build()
        .unwrap();
    let server = axum_test::TestServer::new(app);

    let response = server.post("/api/note").json(&json!({"name": "x"})).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server.delete("/api/note/1").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["message"], "Cannot delete resource");
}

#[tokio::test]
async fn test_delete_guard_is_skipped_in_hard_mode() {
    // with hard delete there is no flag to protect, so the field write goes
    // through like any other update
    let api = build_api(ApiConfig::default().hard_delete());
    create_resource(&api, "foo", "widget").await;

    let response = api
        .server
        .patch("/api/foo/1")
        .json(&json!({"deleted": true}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_custom_soft_delete_field() {
    let store = InMemoryResourceStore::new(vec![
        FieldSpec::new("id"),
        FieldSpec::new("name").required(),
        FieldSpec::new("removed"),
    ]);

    let config = ApiConfig::from_yaml_str(
        r#"
        delete:
            mode: soft
            field: removed
        "#,
    )
    .unwrap();

    let app = ApiBuilder::new()
        .with_config(config)
        .with_association_store(InMemoryAssociationStore::new())
        .register_resource("note", store.clone())
        .build()
        .unwrap();
    let server = axum_test::TestServer::new(app);

    server.post("/api/note").json(&json!({"name": "x"})).await;
    let response = server.delete("/api/note/1").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let row = store.get(1).await.unwrap();
    assert_eq!(row["removed"], true);

    let response = server.get("/api/note/1").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
