//! List and form view models
//!
//! Everything a page shows is derived from the module's field schema; no
//! entity type has its own rendering code.

use crate::contract::{EntityRecord, FieldSpec, FieldType, ModuleConfig, SelectOption, ID_COLUMN};
use serde::Serialize;
use serde_json::Value;

/// Cells of long text columns are cut to this many characters
const TEXTAREA_CELL_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Input control used for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    NumberInput,
    CurrencyInput,
    DatePicker,
    Select,
    TextArea,
    Checkbox,
    RelationInput,
}

impl From<FieldType> for Widget {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => Widget::TextInput,
            FieldType::Number => Widget::NumberInput,
            FieldType::Currency => Widget::CurrencyInput,
            FieldType::Date => Widget::DatePicker,
            FieldType::Select => Widget::Select,
            FieldType::Textarea => Widget::TextArea,
            FieldType::Boolean => Widget::Checkbox,
            FieldType::Relation => Widget::RelationInput,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub sortable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: Option<String>,
    pub cells: Vec<String>,
    /// Delete confirmation is armed for this row
    pub confirming_delete: bool,
}

/// Rendered list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub title: String,
    pub new_label: String,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<RowView>,
    pub loading: bool,
    /// Fetch failure with a retry affordance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Dismissible message, e.g. a failed delete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormFieldView {
    pub name: String,
    pub label: String,
    pub widget: Widget,
    pub value: Value,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rendered create/edit form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub title: String,
    pub submit_label: String,
    pub fields: Vec<FormFieldView>,
    /// Submission in flight; the submit control is disabled
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Inputs for [`render_list`] beyond the records themselves
#[derive(Debug, Default)]
pub struct ListViewState<'a> {
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub sort: Option<(&'a str, SortDirection)>,
    pub confirming_delete: Option<&'a str>,
}

pub fn render_list<'r>(
    config: &ModuleConfig,
    records: impl IntoIterator<Item = &'r EntityRecord>,
    state: ListViewState<'_>,
) -> ListView {
    let columns = config
        .fields
        .iter()
        .map(|f| ColumnView {
            name: f.name.clone(),
            label: f.label.clone(),
            field_type: f.field_type,
            sortable: f.sortable,
            sorted: state
                .sort
                .filter(|(name, _)| *name == f.name)
                .map(|(_, direction)| direction),
        })
        .collect();

    let rows: Vec<RowView> = records
        .into_iter()
        .map(|record| {
            let id = record.get(ID_COLUMN).map(display_raw);
            RowView {
                confirming_delete: id.is_some() && id.as_deref() == state.confirming_delete,
                id,
                cells: config
                    .fields
                    .iter()
                    .map(|f| format_cell(f, record.get(&f.name)))
                    .collect(),
            }
        })
        .collect();

    let empty_message = (rows.is_empty() && !state.loading && state.error.is_none())
        .then(|| format!("No {} yet", config.plural.to_lowercase()));

    ListView {
        title: config.plural.clone(),
        new_label: format!("New {}", config.singular),
        columns,
        rows,
        loading: state.loading,
        error: state.error,
        notice: state.notice,
        empty_message,
    }
}

/// Form for a draft; `existing` selects edit wording over create wording
pub fn render_form(
    config: &ModuleConfig,
    draft: &EntityRecord,
    existing: bool,
    field_errors: &[crate::contract::FieldError],
    submitting: bool,
    error: Option<String>,
) -> FormView {
    let fields = config
        .fields
        .iter()
        .map(|f| FormFieldView {
            name: f.name.clone(),
            label: f.label.clone(),
            widget: f.field_type.into(),
            value: draft.get(&f.name).cloned().unwrap_or(Value::Null),
            required: f.required,
            options: f.options.clone(),
            error: field_errors
                .iter()
                .find(|e| e.field == f.name)
                .map(|e| e.message.clone()),
        })
        .collect();

    let (title, submit_label) = if existing {
        (format!("Edit {}", config.singular), "Save")
    } else {
        (format!("New {}", config.singular), "Create")
    };

    FormView {
        title,
        submit_label: submit_label.to_string(),
        fields,
        submitting,
        error,
    }
}

/// Display text of one cell
pub fn format_cell(field: &FieldSpec, value: Option<&Value>) -> String {
    let value = match value {
        None | Some(Value::Null) => return String::new(),
        Some(v) => v,
    };

    match field.field_type {
        FieldType::Currency => match as_number(value) {
            Some(amount) => format_currency(amount),
            None => display_raw(value),
        },
        FieldType::Number => match as_number(value) {
            Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
            Some(n) => n.to_string(),
            None => display_raw(value),
        },
        FieldType::Boolean => match value {
            Value::Bool(true) => "Yes".to_string(),
            Value::Bool(false) => "No".to_string(),
            other => display_raw(other),
        },
        FieldType::Select => {
            let raw = display_raw(value);
            field.option_label(&raw).map(str::to_string).unwrap_or(raw)
        }
        FieldType::Textarea => truncate(&display_raw(value), TEXTAREA_CELL_WIDTH),
        FieldType::Text | FieldType::Date | FieldType::Relation => display_raw(value),
    }
}

/// `$1,234.50` style rendering
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

/// Order two values of the same column for sorting
pub fn compare_values(field: &FieldSpec, a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let blank = |v: Option<&Value>| matches!(v, None | Some(Value::Null));
    match (blank(a), blank(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };

    match field.field_type {
        FieldType::Number | FieldType::Currency => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => display_raw(a).cmp(&display_raw(b)),
        },
        FieldType::Boolean => a.as_bool().cmp(&b.as_bool()),
        _ => display_raw(a).to_lowercase().cmp(&display_raw(b).to_lowercase()),
    }
}
