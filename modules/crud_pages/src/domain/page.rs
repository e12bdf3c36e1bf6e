//! Generic CRUD page state machine
//!
//! ```text
//! Loading ──ok──▶ Listing ⇄ Editing ⇄ Submitting ──ok──▶ (refetch) Listing
//!    └──err──▶ ListingError ──retry──▶ Loading       └──err──▶ SubmitError ──edit/dismiss──▶ Editing
//! ```
//!
//! The pending states (`Loading`, `Submitting`) are the only guard against
//! double submission. Deletes are optimistic; a rollback is applied only when
//! no newer list fetch has landed since the delete began (list generation).
//! A record is never updated and deleted at the same time.

use super::adapter::CrudAdapter;
use super::validation::{default_draft, validate_record, ValidationMode};
use super::view::{compare_values, render_form, render_list, FormView, ListView, ListViewState, SortDirection};
use crate::contract::{CrudError, EntityRecord, FieldError, Filter, ModuleConfig, ID_COLUMN};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// What the form will do on submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing { id: String },
}

/// In-progress draft with its inline field errors
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub target: EditTarget,
    pub draft: EntityRecord,
    pub field_errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Loading,
    Listing,
    ListingError { error: CrudError },
    Editing(EditSession),
    Submitting(EditSession),
    SubmitError { session: EditSession, error: CrudError },
}

impl PageState {
    pub fn name(&self) -> &'static str {
        match self {
            PageState::Loading => "loading",
            PageState::Listing => "listing",
            PageState::ListingError { .. } => "listing_error",
            PageState::Editing(_) => "editing",
            PageState::Submitting(_) => "submitting",
            PageState::SubmitError { .. } => "submit_error",
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self, PageState::Loading | PageState::Submitting(_))
    }
}

/// Submission accepted by [`CrudPage::begin_submit`], awaiting its store result
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmit {
    pub target: EditTarget,
    pub payload: EntityRecord,
}

/// Delete accepted by [`CrudPage::begin_delete`]; carries what a rollback needs
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub id: String,
    record: EntityRecord,
    generation: u64,
}

/// Row removed from the cache while its delete is in flight
#[derive(Debug, Clone, Copy)]
struct Removal {
    generation: u64,
    /// Index in the landed list, counting rows still being deleted
    slot: usize,
}

/// One page: a module configuration, an optional project scope and the list
/// and form state rendered from them
pub struct CrudPage {
    config: Arc<ModuleConfig>,
    scope: Option<String>,
    adapter: CrudAdapter,
    filters: Vec<Filter>,
    state: PageState,
    records: Vec<EntityRecord>,
    generation: u64,
    sort: Option<(String, SortDirection)>,
    confirming_delete: Option<String>,
    deleting: HashMap<String, Removal>,
    notice: Option<CrudError>,
}

impl CrudPage {
    pub fn new(config: Arc<ModuleConfig>, scope: Option<String>, adapter: CrudAdapter) -> Self {
        Self {
            config,
            scope,
            adapter,
            filters: Vec::new(),
            state: PageState::Loading,
            records: Vec::new(),
            generation: 0,
            sort: None,
            confirming_delete: None,
            deleting: HashMap::new(),
            notice: None,
        }
    }

    /// Extra equality filters applied to every list fetch
    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Cached list in store order
    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// Number of list fetches that have landed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn notice(&self) -> Option<&CrudError> {
        self.notice.as_ref()
    }

    // ===== Listing =====

    /// Initial fetch
    pub async fn mount(&mut self) {
        self.load().await;
    }

    /// Re-issue the list fetch after a failure; ignored in any other state
    pub async fn retry(&mut self) {
        if matches!(self.state, PageState::ListingError { .. }) {
            self.load().await;
        }
    }

    async fn load(&mut self) {
        self.state = PageState::Loading;
        self.state = match self.fetch().await {
            Ok(()) => PageState::Listing,
            Err(error) => PageState::ListingError { error },
        };
    }

    async fn fetch(&mut self) -> Result<(), CrudError> {
        let records = self
            .adapter
            .list(&self.config, self.scope.as_deref(), &self.filters)
            .await?;
        self.records = records;
        self.generation += 1;
        self.confirming_delete = None;
        tracing::debug!(
            module = %self.config.key,
            count = self.records.len(),
            generation = self.generation,
            "List landed"
        );
        Ok(())
    }

    /// Sort the displayed rows by a sortable column; the cache keeps store order
    pub fn sort_by(&mut self, field: &str, direction: SortDirection) -> Result<(), CrudError> {
        match self.config.field_spec(field) {
            Some(spec) if spec.sortable => {
                self.sort = Some((field.to_string(), direction));
                Ok(())
            }
            Some(_) => Err(CrudError::configuration(format!("field '{field}' is not sortable"))),
            None => Err(CrudError::configuration(format!(
                "unknown field '{field}' for module '{}'",
                self.config.key
            ))),
        }
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Rows in display order
    pub fn visible_records(&self) -> Vec<&EntityRecord> {
        let mut rows: Vec<&EntityRecord> = self.records.iter().collect();
        if let Some((field, direction)) = &self.sort {
            if let Some(spec) = self.config.field_spec(field) {
                rows.sort_by(|a, b| {
                    let ord = compare_values(spec, a.get(field), b.get(field));
                    match direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                });
            }
        }
        rows
    }

    // ===== Editing =====

    /// Open an empty form seeded from the field types
    pub fn open_new(&mut self) -> Result<(), CrudError> {
        self.ensure_idle()?;
        self.confirming_delete = None;
        self.state = PageState::Editing(EditSession {
            target: EditTarget::New,
            draft: default_draft(&self.config),
            field_errors: Vec::new(),
        });
        Ok(())
    }

    /// Open the form seeded with a cached record's values
    pub fn open_existing(&mut self, id: &str) -> Result<(), CrudError> {
        self.ensure_idle()?;
        let record = self
            .records
            .iter()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| self.not_found(id))?;
        self.confirming_delete = None;

        let mut draft = default_draft(&self.config);
        for field in &self.config.fields {
            if let Some(value) = record.get(&field.name) {
                draft.insert(field.name.clone(), value.clone());
            }
        }

        self.state = PageState::Editing(EditSession {
            target: EditTarget::Existing { id: id.to_string() },
            draft,
            field_errors: Vec::new(),
        });
        Ok(())
    }

    /// Change one draft value; the list cache is never touched
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), CrudError> {
        if self.config.field_spec(name).is_none() {
            return Err(CrudError::configuration(format!(
                "unknown field '{name}' for module '{}'",
                self.config.key
            )));
        }

        let state = std::mem::replace(&mut self.state, PageState::Loading);
        let mut session = match state {
            PageState::Editing(session) | PageState::SubmitError { session, .. } => session,
            other => {
                let err = if other.is_pending() {
                    CrudError::Busy
                } else {
                    CrudError::configuration("no form is open")
                };
                self.state = other;
                return Err(err);
            }
        };

        session.draft.insert(name.to_string(), value.into());
        session.field_errors.retain(|e| e.field != name);
        self.state = PageState::Editing(session);
        Ok(())
    }

    /// Current draft, if a form is open
    pub fn draft(&self) -> Option<&EntityRecord> {
        self.session().map(|s| &s.draft)
    }

    /// Close the form without saving
    pub fn cancel_edit(&mut self) -> Result<(), CrudError> {
        match self.state {
            PageState::Submitting(_) => Err(CrudError::Busy),
            PageState::Editing(_) | PageState::SubmitError { .. } => {
                self.state = PageState::Listing;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Dismiss the submit error (keeping the draft) and any notice
    pub fn dismiss_error(&mut self) {
        self.notice = None;
        let state = std::mem::replace(&mut self.state, PageState::Loading);
        self.state = match state {
            PageState::SubmitError { session, .. } => PageState::Editing(session),
            other => other,
        };
    }

    // ===== Submitting =====

    /// Validate the draft and enter `Submitting`.
    ///
    /// Invalid required fields keep the form open with inline errors; the
    /// adapter is not contacted.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, CrudError> {
        let state = std::mem::replace(&mut self.state, PageState::Loading);
        let mut session = match state {
            PageState::Editing(session) | PageState::SubmitError { session, .. } => session,
            other => {
                let err = if other.is_pending() {
                    CrudError::Busy
                } else {
                    CrudError::configuration("no form is open")
                };
                self.state = other;
                return Err(err);
            }
        };

        if let EditTarget::Existing { id } = &session.target {
            if self.deleting.contains_key(id) {
                self.state = PageState::Editing(session);
                return Err(CrudError::Busy);
            }
        }

        // Drafts always carry every field, so edits are checked in full too
        if let Err(error) = validate_record(&self.config, &session.draft, ValidationMode::Full) {
            session.field_errors = error.field_errors().to_vec();
            self.state = PageState::Editing(session);
            return Err(error);
        }

        session.field_errors.clear();
        let pending = PendingSubmit {
            target: session.target.clone(),
            payload: session.draft.clone(),
        };
        self.state = PageState::Submitting(session);
        Ok(pending)
    }

    /// Apply the store's answer to a submission.
    ///
    /// Success refetches the list exactly once; failure keeps the draft.
    pub async fn finish_submit(
        &mut self,
        pending: PendingSubmit,
        result: Result<EntityRecord, CrudError>,
    ) {
        let state = std::mem::replace(&mut self.state, PageState::Loading);
        let session = match state {
            PageState::Submitting(session) if session.target == pending.target => session,
            other => {
                tracing::warn!(state = other.name(), "Ignoring submit result outside of Submitting");
                self.state = other;
                return;
            }
        };

        match result {
            Ok(_) => self.load().await,
            Err(error) => {
                tracing::debug!(module = %self.config.key, %error, "Submit failed, keeping draft");
                self.state = PageState::SubmitError { session, error };
            }
        }
    }

    /// Validate, send and refetch
    pub async fn submit(&mut self) -> Result<EntityRecord, CrudError> {
        let pending = self.begin_submit()?;
        let result = match &pending.target {
            EditTarget::New => {
                self.adapter
                    .create(&self.config, self.scope.as_deref(), pending.payload.clone())
                    .await
            }
            EditTarget::Existing { id } => {
                self.adapter
                    .update(&self.config, id, pending.payload.clone())
                    .await
            }
        };
        self.finish_submit(pending, result.clone()).await;
        result
    }

    // ===== Deleting =====

    /// Arm the confirmation step for a row
    pub fn request_delete(&mut self, id: &str) -> Result<(), CrudError> {
        self.ensure_idle()?;
        if !self.records.iter().any(|r| record_id(r) == Some(id)) {
            return Err(self.not_found(id));
        }
        self.confirming_delete = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = None;
    }

    /// Row awaiting confirmation
    pub fn confirming_delete(&self) -> Option<&str> {
        self.confirming_delete.as_deref()
    }

    /// Consume the confirmation and remove the row from the cache.
    ///
    /// Refused with `Busy` while a list fetch or a submission is in flight.
    pub fn begin_delete(&mut self) -> Result<PendingDelete, CrudError> {
        self.ensure_idle()?;
        let id = self
            .confirming_delete
            .take()
            .ok_or_else(|| CrudError::configuration("delete was not confirmed"))?;
        if self.deleting.contains_key(&id) {
            return Err(CrudError::Busy);
        }
        let index = self
            .records
            .iter()
            .position(|r| record_id(r) == Some(id.as_str()))
            .ok_or_else(|| self.not_found(&id))?;

        // Map the cache index back onto the landed list
        let mut taken = self.removed_slots(&id);
        taken.sort_unstable();
        let mut slot = index;
        for t in taken {
            if t <= slot {
                slot += 1;
            }
        }

        let record = self.records.remove(index);
        self.deleting.insert(
            id.clone(),
            Removal {
                generation: self.generation,
                slot,
            },
        );
        Ok(PendingDelete {
            id,
            record,
            generation: self.generation,
        })
    }

    /// Apply the store's answer to a delete.
    ///
    /// A failure restores the row at its prior position unless a newer list
    /// has landed in the meantime. A missing row counts as deleted.
    pub fn finish_delete(&mut self, pending: PendingDelete, result: Result<(), CrudError>) {
        // Slots shift as other deletes settle, so the live one is used
        let slot = self
            .deleting
            .remove(&pending.id)
            .filter(|r| r.generation == self.generation && pending.generation == self.generation)
            .map(|r| r.slot);

        match result {
            Ok(()) => {
                if let Some(slot) = slot {
                    self.close_slot(slot);
                }
            }
            Err(CrudError::NotFound { .. }) => {
                tracing::debug!(id = %pending.id, "Row was already gone from the store");
                if let Some(slot) = slot {
                    self.close_slot(slot);
                }
            }
            Err(error) => {
                if let Some(slot) = slot {
                    let before = self
                        .removed_slots(&pending.id)
                        .into_iter()
                        .filter(|t| *t < slot)
                        .count();
                    let index = (slot - before).min(self.records.len());
                    self.records.insert(index, pending.record);
                } else {
                    tracing::debug!(
                        id = %pending.id,
                        started = pending.generation,
                        current = self.generation,
                        "Discarding stale delete rollback"
                    );
                }
                self.notice = Some(error);
            }
        }
    }

    /// Delete the confirmed row
    pub async fn confirm_delete(&mut self) -> Result<(), CrudError> {
        let pending = self.begin_delete()?;
        let result = self.adapter.delete(&self.config, &pending.id).await;
        self.finish_delete(pending, result.clone());
        result
    }

    // ===== Rendering =====

    pub fn list_view(&self) -> ListView {
        let error = match &self.state {
            PageState::ListingError { error } => Some(error.to_string()),
            _ => None,
        };
        render_list(
            &self.config,
            self.visible_records(),
            ListViewState {
                loading: matches!(self.state, PageState::Loading),
                error,
                notice: self.notice.as_ref().map(ToString::to_string),
                sort: self.sort.as_ref().map(|(f, d)| (f.as_str(), *d)),
                confirming_delete: self.confirming_delete.as_deref(),
            },
        )
    }

    /// Form for the open draft, if any
    pub fn form_view(&self) -> Option<FormView> {
        let (session, submitting, error) = match &self.state {
            PageState::Editing(session) => (session, false, None),
            PageState::Submitting(session) => (session, true, None),
            PageState::SubmitError { session, error } => (session, false, Some(error.to_string())),
            _ => return None,
        };
        Some(render_form(
            &self.config,
            &session.draft,
            matches!(session.target, EditTarget::Existing { .. }),
            &session.field_errors,
            submitting,
            error,
        ))
    }

    // ===== Helpers =====

    fn session(&self) -> Option<&EditSession> {
        match &self.state {
            PageState::Editing(session)
            | PageState::Submitting(session)
            | PageState::SubmitError { session, .. } => Some(session),
            _ => None,
        }
    }

    fn ensure_idle(&self) -> Result<(), CrudError> {
        if self.state.is_pending() {
            Err(CrudError::Busy)
        } else {
            Ok(())
        }
    }

    /// Slots of other rows removed from the current list and not yet settled
    fn removed_slots(&self, except: &str) -> Vec<usize> {
        self.deleting
            .iter()
            .filter(|(id, r)| id.as_str() != except && r.generation == self.generation)
            .map(|(_, r)| r.slot)
            .collect()
    }

    /// A row is gone for good; later slots move up by one
    fn close_slot(&mut self, slot: usize) {
        let generation = self.generation;
        for removal in self.deleting.values_mut() {
            if removal.generation == generation && removal.slot > slot {
                removal.slot -= 1;
            }
        }
    }

    fn not_found(&self, id: &str) -> CrudError {
        CrudError::NotFound {
            table: self.config.table.clone(),
            id: id.to_string(),
        }
    }
}

fn record_id(record: &EntityRecord) -> Option<&str> {
    record.get(ID_COLUMN).and_then(Value::as_str)
}
