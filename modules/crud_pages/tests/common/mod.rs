//! Common test utilities: in-memory table store, collecting error sink and
//! construction project fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use crud_pages::contract::{ClientErrorReport, EntityRecord, Filter, ID_COLUMN};
use crud_pages::domain::{ErrorSink, StaticUserProvider, StoreError, TableStore};
use crud_pages::{CrudAdapter, ModuleRegistry};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// One store call as the mock saw it
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select { table: String, filters: Vec<Filter> },
    Insert { table: String, record: EntityRecord },
    Update { table: String, id: String, patch: EntityRecord },
    Delete { table: String, id: String },
    Ping,
}

/// Store operation targeted by failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
    Ping,
}

/// In-memory table store keeping rows in insertion order
#[derive(Clone, Default)]
pub struct MockStore {
    tables: Arc<RwLock<HashMap<String, Vec<EntityRecord>>>>,
    missing: Arc<RwLock<HashSet<String>>>,
    failures: Arc<Mutex<HashMap<Op, Vec<StoreError>>>>,
    delays: Arc<Mutex<HashMap<Op, Duration>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows directly, bypassing the call log
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write();
        let entry = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Value::Object(map) = row {
                entry.push(map);
            }
        }
    }

    pub fn rows(&self, table: &str) -> Vec<EntityRecord> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    /// Make every call on `table` fail as a missing relation
    pub fn drop_table(&self, table: &str) {
        self.missing.write().insert(table.to_string());
    }

    pub fn restore_table(&self, table: &str) {
        self.missing.write().remove(table);
    }

    /// Queue a failure for the next call of `op`
    pub fn fail_next(&self, op: Op, error: StoreError) {
        self.failures.lock().entry(op).or_default().push(error);
    }

    /// Sleep before answering every call of `op`
    pub fn delay(&self, op: Op, duration: Duration) {
        self.delays.lock().insert(op, duration);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| {
                matches!(
                    (c, op),
                    (Call::Select { .. }, Op::Select)
                        | (Call::Insert { .. }, Op::Insert)
                        | (Call::Update { .. }, Op::Update)
                        | (Call::Delete { .. }, Op::Delete)
                        | (Call::Ping, Op::Ping)
                )
            })
            .count()
    }

    async fn enter(&self, op: Op, call: Call, table: Option<&str>) -> Result<(), StoreError> {
        self.calls.lock().push(call);

        let delay = self.delays.lock().get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let injected = {
            let mut failures = self.failures.lock();
            failures.get_mut(&op).and_then(|queue| {
                if queue.is_empty() {
                    None
                } else {
                    Some(queue.remove(0))
                }
            })
        };
        if let Some(error) = injected {
            return Err(error);
        }

        if let Some(table) = table {
            if self.missing.read().contains(table) {
                return Err(StoreError::MissingRelation(format!(
                    "relation \"{table}\" does not exist"
                )));
            }
        }
        Ok(())
    }
}

fn row_id(row: &EntityRecord) -> Option<&str> {
    row.get(ID_COLUMN).and_then(Value::as_str)
}

#[async_trait]
impl TableStore for MockStore {
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<EntityRecord>, StoreError> {
        let call = Call::Select {
            table: table.to_string(),
            filters: filters.to_vec(),
        };
        self.enter(Op::Select, call, Some(table)).await?;

        let rows = self.rows(table);
        Ok(rows
            .into_iter()
            .filter(|row| {
                filters
                    .iter()
                    .all(|f| row.get(&f.column).unwrap_or(&Value::Null) == &f.value)
            })
            .collect())
    }

    async fn insert(&self, table: &str, record: &EntityRecord) -> Result<EntityRecord, StoreError> {
        let call = Call::Insert {
            table: table.to_string(),
            record: record.clone(),
        };
        self.enter(Op::Insert, call, Some(table)).await?;

        let mut stored = record.clone();
        stored
            .entry("created_at".to_string())
            .or_insert_with(|| json!("2025-03-01T08:00:00Z"));

        let mut tables = self.tables.write();
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| row_id(r) == row_id(&stored)) {
            return Err(StoreError::Rejected("duplicate primary key".into()));
        }
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> Result<EntityRecord, StoreError> {
        let call = Call::Update {
            table: table.to_string(),
            id: id.to_string(),
            patch: patch.clone(),
        };
        self.enter(Op::Update, call, Some(table)).await?;

        let mut tables = self.tables.write();
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
            .ok_or(StoreError::RowNotFound)?;
        for (k, v) in patch {
            row.insert(k.clone(), v.clone());
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let call = Call::Delete {
            table: table.to_string(),
            id: id.to_string(),
        };
        self.enter(Op::Delete, call, Some(table)).await?;

        let mut tables = self.tables.write();
        let rows = tables.get_mut(table).ok_or(StoreError::RowNotFound)?;
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() == before {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter(Op::Ping, Call::Ping, None).await
    }
}

/// Error sink remembering every report
#[derive(Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<ClientErrorReport>>,
}

impl CollectingSink {
    pub fn reports(&self) -> Vec<ClientErrorReport> {
        self.reports.lock().clone()
    }
}

#[async_trait]
impl ErrorSink for CollectingSink {
    async fn record(&self, report: ClientErrorReport) -> anyhow::Result<()> {
        self.reports.lock().push(report);
        Ok(())
    }
}

// ===== Fixtures =====

pub const PROJECT: &str = "proj-1";
pub const OTHER_PROJECT: &str = "proj-2";
pub const USER: &str = "pm@harborview.test";

pub fn registry() -> Arc<ModuleRegistry> {
    Arc::new(
        crud_pages::domain::builtin::builder()
            .build()
            .unwrap_or_else(|e| panic!("built-in registry must be valid: {e}")),
    )
}

/// Adapter over `store` stamping inserts with [`USER`]
pub fn adapter(store: &MockStore) -> CrudAdapter {
    CrudAdapter::new(
        Arc::new(store.clone()),
        Arc::new(StaticUserProvider::new(USER)),
    )
}

/// Two RFIs on [`PROJECT`] and one on [`OTHER_PROJECT`]
pub fn seed_rfis(store: &MockStore) {
    store.seed(
        "rfis",
        vec![
            json!({
                "id": "rfi-1", "project_id": PROJECT, "created_by": USER,
                "number": 1, "subject": "Footing depth at grid C4",
                "status": "open", "due_date": "2025-03-14"
            }),
            json!({
                "id": "rfi-2", "project_id": PROJECT, "created_by": USER,
                "number": 2, "subject": "Curtain wall anchor spacing",
                "status": "in_review", "due_date": "2025-03-07"
            }),
            json!({
                "id": "rfi-9", "project_id": OTHER_PROJECT, "created_by": USER,
                "number": 1, "subject": "Roof drain sizing",
                "status": "open", "due_date": "2025-04-01"
            }),
        ],
    );
}

/// Three contacts, unscoped
pub fn seed_contacts(store: &MockStore) {
    store.seed(
        "contacts",
        vec![
            json!({"id": "c-1", "name": "Dana Ortiz", "company": "Ortiz Concrete", "role": "subcontractor"}),
            json!({"id": "c-2", "name": "Lee Park", "company": "Park Glazing", "role": "architect"}),
            json!({"id": "c-3", "name": "Sam Reyes", "company": "Reyes Electric", "role": "engineer"}),
        ],
    );
}

pub fn record(value: Value) -> EntityRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

pub fn ids(records: &[EntityRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| row_id(r).map(str::to_string))
        .collect()
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}
