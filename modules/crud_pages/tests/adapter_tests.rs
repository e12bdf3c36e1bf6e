//! Integration tests for the query/mutation adapter

mod common;

use common::*;
use crud_pages::contract::{
    ConfigOverride, CrudError, Filter, HealthStatus, CREATED_BY_COLUMN, ID_COLUMN, PROJECT_COLUMN,
};
use crud_pages::domain::{builtin, StoreError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn scoped_list_without_project_makes_no_store_call() {
    print_test_header(
        "scoped_list_without_project_makes_no_store_call",
        &["A project-scoped module refuses to list without a scope"],
    );

    let store = MockStore::new();
    let adapter = adapter(&store);
    let rfis = builtin::rfis();

    for scope in [None, Some(""), Some("   ")] {
        let err = adapter.list(&rfis, scope, &[]).await.unwrap_err();
        assert!(matches!(err, CrudError::Configuration { .. }), "{err:?}");
    }
    let err = adapter.create(&rfis, None, record(json!({"subject": "x"}))).await.unwrap_err();
    assert!(matches!(err, CrudError::Configuration { .. }));

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn scoped_list_filters_by_project() {
    let store = MockStore::new();
    seed_rfis(&store);
    let adapter = adapter(&store);

    let records = adapter.list(&builtin::rfis(), Some(PROJECT), &[]).await.unwrap();

    assert_eq!(ids(&records), vec!["rfi-1", "rfi-2"]);
    assert_eq!(
        store.calls(),
        vec![Call::Select {
            table: "rfis".into(),
            filters: vec![Filter::eq(PROJECT_COLUMN, PROJECT)],
        }]
    );
}

#[tokio::test]
async fn unscoped_module_ignores_scope() {
    let store = MockStore::new();
    seed_contacts(&store);
    let adapter = adapter(&store);

    let records = adapter
        .list(&builtin::contacts(), Some(PROJECT), &[])
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(
        store.calls(),
        vec![Call::Select {
            table: "contacts".into(),
            filters: vec![],
        }]
    );
}

#[tokio::test]
async fn extra_filters_are_checked_against_columns() {
    let store = MockStore::new();
    seed_rfis(&store);
    let adapter = adapter(&store);
    let rfis = builtin::rfis();

    let open = adapter
        .list(&rfis, Some(PROJECT), &[Filter::eq("status", "open")])
        .await
        .unwrap();
    assert_eq!(ids(&open), vec!["rfi-1"]);

    let err = adapter
        .list(&rfis, Some(PROJECT), &[Filter::eq("bogus", "x")])
        .await
        .unwrap_err();
    assert!(matches!(err, CrudError::Configuration { .. }));
    assert_eq!(store.count(Op::Select), 1);
}

#[tokio::test]
async fn scoped_filter_cannot_widen_the_scope() {
    let store = MockStore::new();
    seed_rfis(&store);
    let adapter = adapter(&store);

    let records = adapter
        .list(
            &builtin::rfis(),
            Some(PROJECT),
            &[Filter::eq(PROJECT_COLUMN, OTHER_PROJECT)],
        )
        .await
        .unwrap();

    assert_eq!(ids(&records), vec!["rfi-1", "rfi-2"]);
}

#[tokio::test]
async fn create_stamps_id_project_and_user() {
    print_test_header(
        "create_stamps_id_project_and_user",
        &[
            "Inserting an RFI on proj-1 as a signed-in user",
            "The payload keeps only configured fields plus the stamped columns",
        ],
    );

    let store = MockStore::new();
    let adapter = adapter(&store);

    let created = adapter
        .create(
            &builtin::rfis(),
            Some(PROJECT),
            record(json!({
                "subject": "Footing depth at grid C4",
                "status": "open",
                "project_id": OTHER_PROJECT,
                "created_by": "mallory",
                "not_a_field": true
            })),
        )
        .await
        .unwrap();

    let Call::Insert { table, record: sent } = &store.calls()[0] else {
        panic!("expected an insert");
    };
    assert_eq!(table, "rfis");
    assert_eq!(sent[PROJECT_COLUMN], json!(PROJECT));
    assert_eq!(sent[CREATED_BY_COLUMN], json!(USER));
    assert!(!sent.contains_key("not_a_field"));
    assert!(sent[ID_COLUMN].as_str().is_some_and(|id| !id.is_empty()));

    assert_eq!(created[ID_COLUMN], sent[ID_COLUMN]);
    assert_eq!(store.rows("rfis").len(), 1);
}

#[tokio::test]
async fn create_keeps_caller_supplied_id() {
    let store = MockStore::new();
    let adapter = adapter(&store);

    let created = adapter
        .create(
            &builtin::contacts(),
            None,
            record(json!({"id": "c-42", "name": "Dana Ortiz"})),
        )
        .await
        .unwrap();

    assert_eq!(created[ID_COLUMN], json!("c-42"));
    assert!(!created.contains_key(PROJECT_COLUMN));
}

#[tokio::test]
async fn anonymous_inserts_use_default_user() {
    let store = MockStore::new();
    let adapter = crud_pages::CrudAdapter::new(
        Arc::new(store.clone()),
        Arc::new(crud_pages::domain::StaticUserProvider::anonymous()),
    )
    .with_default_user("field-tablet");

    let created = adapter
        .create(&builtin::contacts(), None, record(json!({"name": "Lee Park"})))
        .await
        .unwrap();
    assert_eq!(created[CREATED_BY_COLUMN], json!("field-tablet"));

    let as_pm = adapter
        .acting_as("pm@harborview.test")
        .create(&builtin::contacts(), None, record(json!({"name": "Sam Reyes"})))
        .await
        .unwrap();
    assert_eq!(as_pm[CREATED_BY_COLUMN], json!("pm@harborview.test"));
}

#[tokio::test]
async fn session_provider_tracks_sign_in() {
    let store = MockStore::new();
    let session = Arc::new(crud_pages::domain::SessionUserProvider::default());
    let adapter = adapter(&store).with_user_provider(session.clone());

    let before = adapter
        .create(&builtin::contacts(), None, record(json!({"name": "A"})))
        .await
        .unwrap();
    assert_eq!(before[CREATED_BY_COLUMN], json!("system"));

    session.sign_in("super@harborview.test");
    let after = adapter
        .create(&builtin::contacts(), None, record(json!({"name": "B"})))
        .await
        .unwrap();
    assert_eq!(after[CREATED_BY_COLUMN], json!("super@harborview.test"));
}

#[tokio::test]
async fn update_and_delete_report_missing_rows() {
    let store = MockStore::new();
    seed_rfis(&store);
    let adapter = adapter(&store);
    let rfis = builtin::rfis();

    let updated = adapter
        .update(&rfis, "rfi-1", record(json!({"status": "closed", "id": "hijack"})))
        .await
        .unwrap();
    assert_eq!(updated["status"], json!("closed"));
    assert_eq!(updated[ID_COLUMN], json!("rfi-1"));

    let err = adapter
        .update(&rfis, "rfi-404", record(json!({"status": "closed"})))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CrudError::NotFound {
            table: "rfis".into(),
            id: "rfi-404".into()
        }
    );

    adapter.delete(&rfis, "rfi-2").await.unwrap();
    let err = adapter.delete(&rfis, "rfi-2").await.unwrap_err();
    assert!(matches!(err, CrudError::NotFound { ref id, .. } if id == "rfi-2"));
}

#[tokio::test]
async fn store_failures_map_to_error_kinds() {
    let store = MockStore::new();
    let adapter = adapter(&store);
    let contacts = builtin::contacts();

    store.fail_next(Op::Select, StoreError::Unreachable("connection refused".into()));
    assert!(matches!(
        adapter.list(&contacts, None, &[]).await.unwrap_err(),
        CrudError::Transport { .. }
    ));

    store.fail_next(Op::Insert, StoreError::Rejected("check constraint".into()));
    assert!(matches!(
        adapter
            .create(&contacts, None, record(json!({"name": "x"})))
            .await
            .unwrap_err(),
        CrudError::Store { .. }
    ));
}

#[tokio::test]
async fn missing_table_is_schema_mismatch_and_reported() {
    let store = MockStore::new();
    store.drop_table("contacts");
    let sink = Arc::new(CollectingSink::default());
    let adapter = adapter(&store).with_error_sink(sink.clone());

    let err = adapter.list(&builtin::contacts(), None, &[]).await.unwrap_err();

    assert!(matches!(err, CrudError::SchemaMismatch { ref table, .. } if table == "contacts"));
    assert!(!err.is_retryable());

    // The report is persisted in a spawned task
    for _ in 0..10 {
        if !sink.reports().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("contacts"));
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out_as_transport() {
    let store = MockStore::new();
    store.delay(Op::Select, Duration::from_secs(60));
    let adapter = adapter(&store).with_timeout(Duration::from_secs(15));

    let err = adapter.list(&builtin::contacts(), None, &[]).await.unwrap_err();

    assert!(matches!(err, CrudError::Transport { .. }));
    assert!(err.is_retryable());
    assert_eq!(store.count(Op::Select), 1);
}

#[tokio::test(start_paused = true)]
async fn health_reports_degraded_store() {
    let store = MockStore::new();
    let adapter = adapter(&store).with_timeout(Duration::from_secs(2));

    assert_eq!(adapter.health().await, HealthStatus::Healthy);

    store.fail_next(Op::Ping, StoreError::Unreachable("connection reset".into()));
    assert!(!adapter.health().await.is_healthy());

    store.delay(Op::Ping, Duration::from_secs(5));
    assert!(matches!(adapter.health().await, HealthStatus::Degraded { .. }));
}

#[tokio::test]
async fn derived_page_targets_its_own_table() {
    let store = MockStore::new();
    seed_contacts(&store);
    store.seed("subcontractors", vec![json!({"id": "s-1", "name": "Ortiz Concrete"})]);
    let adapter = adapter(&store);

    let base = builtin::contacts();
    let subs = base.derive(&ConfigOverride::default().table("subcontractors"));

    let records = adapter.list(&subs, None, &[]).await.unwrap();
    assert_eq!(ids(&records), vec!["s-1"]);
    assert_eq!(base.table, "contacts");
}
