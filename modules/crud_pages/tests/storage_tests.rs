//! Storage tests against an in-memory SQLite database

mod common;

use common::*;
use crud_pages::contract::{
    ClientErrorReport, CrudApi, Filter, HealthStatus, CREATED_AT_COLUMN, CREATED_BY_COLUMN,
    ID_COLUMN, PROJECT_COLUMN,
};
use crud_pages::domain::{builtin, ErrorSink, StoreError, TableStore};
use crud_pages::infra::storage::entity::error_log;
use crud_pages::infra::storage::{sync_module_tables, Migrator, SeaOrmErrorSink, SeaOrmTableStore};
use crud_pages::{Config, CrudPagesModule, ModuleConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::sync::Arc;

/// A single pooled connection keeps one in-memory database alive
async fn connect() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opts).await.unwrap()
}

async fn provisioned(configs: Vec<ModuleConfig>) -> Arc<DatabaseConnection> {
    let db = connect().await;
    Migrator::up(&db, None).await.unwrap();
    let configs: Vec<Arc<ModuleConfig>> = configs.into_iter().map(Arc::new).collect();
    sync_module_tables(&db, &configs).await.unwrap();
    Arc::new(db)
}

#[tokio::test]
async fn insert_select_update_delete_round_trip() {
    print_test_header(
        "insert_select_update_delete_round_trip",
        &["Rows written through the table store come back with managed columns filled"],
    );

    let db = provisioned(vec![builtin::rfis()]).await;
    let store = SeaOrmTableStore::new(db);

    let inserted = store
        .insert(
            "rfis",
            &record(json!({
                "id": "rfi-1",
                "project_id": PROJECT,
                "created_by": USER,
                "subject": "Footing depth at grid C4",
                "status": "open",
                "number": 1
            })),
        )
        .await
        .unwrap();
    assert_eq!(inserted[ID_COLUMN], json!("rfi-1"));
    assert!(inserted[CREATED_AT_COLUMN].as_str().is_some());
    assert_eq!(inserted["number"].as_f64(), Some(1.0));

    store
        .insert(
            "rfis",
            &record(json!({
                "id": "rfi-9",
                "project_id": OTHER_PROJECT,
                "created_by": USER,
                "subject": "Roof drain sizing",
                "status": "open"
            })),
        )
        .await
        .unwrap();

    let scoped = store
        .select("rfis", &[Filter::eq(PROJECT_COLUMN, PROJECT)])
        .await
        .unwrap();
    assert_eq!(ids(&scoped), vec!["rfi-1"]);

    let open = store
        .select("rfis", &[Filter::eq("status", "open")])
        .await
        .unwrap();
    assert_eq!(open.len(), 2);

    let updated = store
        .update("rfis", "rfi-1", &record(json!({"status": "closed"})))
        .await
        .unwrap();
    assert_eq!(updated["status"], json!("closed"));
    assert_eq!(updated["subject"], json!("Footing depth at grid C4"));
    assert_eq!(updated[CREATED_BY_COLUMN], json!(USER));

    let unchanged = store.update("rfis", "rfi-9", &record(json!({}))).await.unwrap();
    assert_eq!(unchanged["status"], json!("open"));

    store.delete("rfis", "rfi-1").await.unwrap();
    let remaining = store.select("rfis", &[]).await.unwrap();
    assert_eq!(ids(&remaining), vec!["rfi-9"]);
}

#[tokio::test]
async fn null_filter_matches_missing_values() {
    let db = provisioned(vec![builtin::contacts()]).await;
    let store = SeaOrmTableStore::new(db);

    for (id, company) in [("c-1", json!("Ortiz Concrete")), ("c-2", json!(null))] {
        store
            .insert(
                "contacts",
                &record(json!({"id": id, "name": "Someone", "company": company})),
            )
            .await
            .unwrap();
    }

    let without_company = store
        .select("contacts", &[Filter::eq("company", serde_json::Value::Null)])
        .await
        .unwrap();
    assert_eq!(ids(&without_company), vec!["c-2"]);
}

#[tokio::test]
async fn missing_rows_and_tables_are_classified() {
    let db = provisioned(vec![builtin::contacts()]).await;
    let store = SeaOrmTableStore::new(db);

    assert_eq!(
        store
            .update("contacts", "ghost", &record(json!({"name": "x"})))
            .await
            .unwrap_err(),
        StoreError::RowNotFound
    );
    assert_eq!(
        store.delete("contacts", "ghost").await.unwrap_err(),
        StoreError::RowNotFound
    );
    assert_eq!(
        store.update("contacts", "ghost", &record(json!({}))).await.unwrap_err(),
        StoreError::RowNotFound
    );

    let err = store.select("warranties", &[]).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingRelation(_)), "{err:?}");

    let err = store
        .insert("contacts", &record(json!({"id": "c-1", "warranty_months": 12})))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingRelation(_)), "{err:?}");

    store
        .insert("contacts", &record(json!({"id": "c-1", "name": "Dana Ortiz"})))
        .await
        .unwrap();
    let err = store
        .insert("contacts", &record(json!({"id": "c-1", "name": "Dana Ortiz"})))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Rejected(_)), "{err:?}");

    assert!(store.ping().await.is_ok());
}

#[tokio::test]
async fn schema_sync_adds_new_columns_and_is_idempotent() {
    let db = provisioned(vec![builtin::contacts()]).await;

    let widened = builtin::contacts().field(crud_pages::FieldSpec::new(
        "license_no",
        "License #",
        crud_pages::FieldType::Text,
    ));
    let configs = vec![Arc::new(widened)];
    sync_module_tables(&db, &configs).await.unwrap();
    sync_module_tables(&db, &configs).await.unwrap();

    let store = SeaOrmTableStore::new(db);
    let created = store
        .insert(
            "contacts",
            &record(json!({"id": "c-7", "name": "Reyes Electric", "license_no": "EC-4411"})),
        )
        .await
        .unwrap();
    assert_eq!(created["license_no"], json!("EC-4411"));
}

#[tokio::test]
async fn error_sink_writes_error_log_rows() {
    let db = provisioned(vec![]).await;
    let sink = SeaOrmErrorSink::new(db.clone());

    sink.record(ClientErrorReport {
        message: "Failed to load RFIs".into(),
        stack: Some("at CrudPage.fetch".into()),
        url: Some("/projects/proj-1/rfis".into()),
        user_agent: None,
        user: Some(USER.into()),
    })
    .await
    .unwrap();

    let rows = error_log::Entity::find().all(&*db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].message, "Failed to load RFIs");
    assert_eq!(rows[0].reported_by.as_deref(), Some(USER));
    assert!(rows[0].user_agent.is_none());
}

#[tokio::test]
async fn module_init_provisions_every_page_table() {
    print_test_header(
        "module_init_provisions_every_page_table",
        &["A freshly initialized module can create and list on base and derived pages"],
    );

    let module = CrudPagesModule::init(Config::default(), connect().await)
        .await
        .unwrap();
    let client = module.client();

    assert_eq!(client.health().await, HealthStatus::Healthy);

    let created = client
        .create_record(
            "rfis",
            Some(PROJECT),
            record(json!({"subject": "Slab edge detail", "status": "open", "number": 3})),
        )
        .await
        .unwrap();
    assert_eq!(created[PROJECT_COLUMN], json!(PROJECT));
    assert_eq!(created[CREATED_BY_COLUMN], json!("system"));

    let listed = client.list_records("rfis", Some(PROJECT), &[]).await.unwrap();
    assert_eq!(listed.len(), 1);
    let everywhere = client.list_records("all-rfis", None, &[]).await.unwrap();
    assert_eq!(everywhere.len(), 1);

    client
        .create_record("subcontractors", None, record(json!({"name": "Park Glazing"})))
        .await
        .unwrap();
    assert_eq!(client.list_records("subcontractors", None, &[]).await.unwrap().len(), 1);
    assert!(client.list_records("contacts", None, &[]).await.unwrap().is_empty());

    let id = created[ID_COLUMN].as_str().unwrap();
    client.delete_record("rfis", id).await.unwrap();
    assert!(client.list_records("rfis", Some(PROJECT), &[]).await.unwrap().is_empty());
}
