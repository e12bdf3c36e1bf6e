//! Built-in construction modules and page bindings

use super::registry::{ModuleRegistry, RegistryBuilder};
use crate::contract::{ConfigOverride, FieldSpec, FieldType, ModuleConfig, PageBinding};

const STATUS_OPEN_CLOSED: [(&str, &str); 3] =
    [("open", "Open"), ("in_review", "In Review"), ("closed", "Closed")];

pub fn projects() -> ModuleConfig {
    ModuleConfig::new("projects", "projects", "Project", "Projects")
        .field(FieldSpec::new("name", "Project Name", FieldType::Text).required().sortable())
        .field(FieldSpec::new("number", "Project Number", FieldType::Text).sortable())
        .field(FieldSpec::new("address", "Site Address", FieldType::Textarea))
        .field(FieldSpec::new("contract_value", "Contract Value", FieldType::Currency).sortable())
        .field(FieldSpec::new("start_date", "Start Date", FieldType::Date).sortable())
        .field(
            FieldSpec::new("phase", "Phase", FieldType::Select).with_options([
                ("preconstruction", "Preconstruction"),
                ("construction", "Construction"),
                ("closeout", "Closeout"),
            ]),
        )
}

pub fn rfis() -> ModuleConfig {
    ModuleConfig::new("rfis", "rfis", "RFI", "RFIs")
        .project_scoped()
        .field(FieldSpec::new("number", "RFI #", FieldType::Number).sortable())
        .field(FieldSpec::new("subject", "Subject", FieldType::Text).required())
        .field(FieldSpec::new("question", "Question", FieldType::Textarea))
        .field(FieldSpec::new("assigned_to", "Assigned To", FieldType::Relation))
        .field(FieldSpec::new("due_date", "Due Date", FieldType::Date).sortable())
        .field(FieldSpec::new("cost_impact", "Cost Impact", FieldType::Boolean))
        .field(FieldSpec::new("status", "Status", FieldType::Select).with_options(STATUS_OPEN_CLOSED))
}

pub fn submittals() -> ModuleConfig {
    ModuleConfig::new("submittals", "submittals", "Submittal", "Submittals")
        .project_scoped()
        .field(FieldSpec::new("spec_section", "Spec Section", FieldType::Text).required().sortable())
        .field(FieldSpec::new("title", "Title", FieldType::Text).required())
        .field(FieldSpec::new("subcontractor", "Subcontractor", FieldType::Relation))
        .field(FieldSpec::new("submitted_on", "Submitted", FieldType::Date).sortable())
        .field(
            FieldSpec::new("status", "Status", FieldType::Select).with_options([
                ("pending", "Pending"),
                ("approved", "Approved"),
                ("approved_as_noted", "Approved as Noted"),
                ("revise_resubmit", "Revise & Resubmit"),
            ]),
        )
}

pub fn change_orders() -> ModuleConfig {
    ModuleConfig::new("change_orders", "change_orders", "Change Order", "Change Orders")
        .project_scoped()
        .field(FieldSpec::new("number", "CO #", FieldType::Number).sortable())
        .field(FieldSpec::new("title", "Title", FieldType::Text).required())
        .field(FieldSpec::new("amount", "Amount", FieldType::Currency).required().sortable())
        .field(FieldSpec::new("schedule_days", "Schedule Impact (days)", FieldType::Number))
        .field(FieldSpec::new("reason", "Reason", FieldType::Textarea))
        .field(
            FieldSpec::new("status", "Status", FieldType::Select).with_options([
                ("draft", "Draft"),
                ("pending", "Pending Approval"),
                ("approved", "Approved"),
                ("rejected", "Rejected"),
            ]),
        )
}

pub fn daily_logs() -> ModuleConfig {
    ModuleConfig::new("daily_logs", "daily_logs", "Daily Log", "Daily Logs")
        .project_scoped()
        .field(FieldSpec::new("log_date", "Date", FieldType::Date).required().sortable())
        .field(FieldSpec::new("weather", "Weather", FieldType::Text))
        .field(FieldSpec::new("crew_count", "Crew Count", FieldType::Number))
        .field(FieldSpec::new("work_performed", "Work Performed", FieldType::Textarea).required())
        .field(FieldSpec::new("safety_incident", "Safety Incident", FieldType::Boolean))
}

pub fn punch_items() -> ModuleConfig {
    ModuleConfig::new("punch_items", "punch_items", "Punch Item", "Punch List")
        .project_scoped()
        .field(FieldSpec::new("location", "Location", FieldType::Text).required().sortable())
        .field(FieldSpec::new("description", "Description", FieldType::Textarea).required())
        .field(FieldSpec::new("trade", "Responsible Trade", FieldType::Relation))
        .field(FieldSpec::new("due_date", "Due Date", FieldType::Date).sortable())
        .field(FieldSpec::new("complete", "Complete", FieldType::Boolean))
}

pub fn budget_items() -> ModuleConfig {
    ModuleConfig::new("budget_items", "budget_items", "Budget Line", "Budget")
        .project_scoped()
        .field(FieldSpec::new("cost_code", "Cost Code", FieldType::Text).required().sortable())
        .field(FieldSpec::new("description", "Description", FieldType::Text).required())
        .field(FieldSpec::new("original_amount", "Original Budget", FieldType::Currency).sortable())
        .field(FieldSpec::new("committed_amount", "Committed", FieldType::Currency))
        .field(FieldSpec::new("actual_amount", "Actual Cost", FieldType::Currency))
}

pub fn meetings() -> ModuleConfig {
    ModuleConfig::new("meetings", "meetings", "Meeting", "Meetings")
        .project_scoped()
        .field(FieldSpec::new("title", "Title", FieldType::Text).required())
        .field(FieldSpec::new("meeting_date", "Date", FieldType::Date).required().sortable())
        .field(
            FieldSpec::new("kind", "Type", FieldType::Select).with_options([
                ("oac", "OAC"),
                ("subcontractor", "Subcontractor"),
                ("safety", "Safety"),
            ]),
        )
        .field(FieldSpec::new("minutes", "Minutes", FieldType::Textarea))
}

pub fn contacts() -> ModuleConfig {
    ModuleConfig::new("contacts", "contacts", "Contact", "Contacts")
        .field(FieldSpec::new("name", "Name", FieldType::Text).required().sortable())
        .field(FieldSpec::new("company", "Company", FieldType::Text).sortable())
        .field(FieldSpec::new("email", "Email", FieldType::Text))
        .field(FieldSpec::new("phone", "Phone", FieldType::Text))
        .field(
            FieldSpec::new("role", "Role", FieldType::Select).with_options([
                ("owner", "Owner"),
                ("architect", "Architect"),
                ("engineer", "Engineer"),
                ("subcontractor", "Subcontractor"),
                ("supplier", "Supplier"),
            ]),
        )
}

/// Every built-in module in menu order
pub fn modules() -> Vec<ModuleConfig> {
    vec![
        projects(),
        rfis(),
        submittals(),
        change_orders(),
        daily_logs(),
        punch_items(),
        budget_items(),
        meetings(),
        contacts(),
    ]
}

/// Pages that render a module with overrides
pub fn pages() -> Vec<PageBinding> {
    vec![
        PageBinding::new("project-contacts", "contacts").with_overrides(
            ConfigOverride::default()
                .project_scoped(true)
                .singular("Project Contact")
                .plural("Project Team"),
        ),
        PageBinding::new("subcontractors", "contacts").with_overrides(
            ConfigOverride::default()
                .table("subcontractors")
                .singular("Subcontractor")
                .plural("Subcontractors"),
        ),
        PageBinding::new("all-rfis", "rfis").with_overrides(
            ConfigOverride::default()
                .project_scoped(false)
                .plural("All RFIs"),
        ),
    ]
}

/// Builder preloaded with the built-in modules and pages
pub fn builder() -> RegistryBuilder {
    let builder = modules()
        .into_iter()
        .fold(ModuleRegistry::builder(), RegistryBuilder::module);
    pages().into_iter().fold(builder, RegistryBuilder::page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_valid() {
        let registry = builder().build().unwrap();
        assert_eq!(registry.modules().count(), 9);
        assert!(registry.get("rfis").project_scoped);
        assert!(!registry.get("contacts").project_scoped);
        assert_eq!(
            registry.resolve_page("subcontractors").unwrap().table,
            "subcontractors"
        );
        assert!(!registry.resolve_page("all-rfis").unwrap().project_scoped);
    }
}
