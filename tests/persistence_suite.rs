mod common;

use std::fs;
use std::sync::Arc;

use interreg_core::config::Config;
use interreg_core::core::{NewTask, Services};
use interreg_core::domain::{ApprovalDecision, ExpenseStatus, RecurrenceKind, RecurrenceSpec};
use interreg_core::storage::{json_backend::STORE_FILE, JsonStore, StoreData, STORE_SCHEMA_VERSION};
use rust_decimal_macros::dec;

use common::{date, json_services};

fn reopen(base: &std::path::Path) -> Services {
    let store = Arc::new(JsonStore::open_in(base).expect("reopen store"));
    Services::new(store, &Config::default())
}

#[test]
fn workflow_state_survives_restart() {
    let (base, services) = json_services();
    let item = services
        .budgets
        .create_budget_item("Staff", dec!(20000))
        .unwrap();
    let expense = services
        .expenses
        .submit_expense(item.id, dec!(4500.75), "Salaries Q1")
        .unwrap();
    let admin = services.users.register_user("Lea", "admin").unwrap();
    services
        .expenses
        .submit_approval(expense.id, admin.id, ApprovalDecision::Approved, None)
        .unwrap();
    let task = services
        .tasks
        .create_task(NewTask {
            title: "Quarterly claim".into(),
            start_date: Some(date(2025, 1, 1)),
            end_date: Some(date(2025, 12, 31)),
            recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Quarterly)),
        })
        .unwrap();
    services.tasks.regenerate_subtasks(task.id).unwrap();
    drop(services);

    let services = reopen(&base);
    assert_eq!(
        services.budgets.budget_item(item.id).unwrap().spent_amount,
        dec!(4500.75)
    );
    let stored = services.expenses.expense(expense.id).unwrap();
    assert_eq!(stored.status, ExpenseStatus::Approved);
    assert_eq!(stored.approvals.len(), 1);
    assert_eq!(services.tasks.subtasks(task.id).unwrap().len(), 4);
    assert_eq!(services.users.users().unwrap().len(), 1);
}

#[test]
fn snapshot_is_versioned_camel_case_json() {
    let (base, services) = json_services();
    services.budgets.create_budget_item("Audit", dec!(1500)).unwrap();

    let raw = fs::read_to_string(base.join(STORE_FILE)).unwrap();
    assert!(raw.contains("\"plannedAmount\""));
    let data: StoreData = serde_json::from_str(&raw).unwrap();
    assert_eq!(data.schema_version, STORE_SCHEMA_VERSION);
    assert_eq!(data.budget_items.len(), 1);
    // No temp file is left behind after an atomic write.
    assert!(!base.join(format!("{STORE_FILE}.tmp")).exists());
}

#[test]
fn corrupt_snapshot_is_a_storage_error() {
    let base = common::temp_base();
    fs::write(base.join(STORE_FILE), "{ not json").unwrap();
    let err = JsonStore::open_in(&base).err().expect("corrupt store must fail");
    assert!(matches!(err, interreg_core::errors::CoreError::Storage(_)));
}

#[test]
fn failed_approval_write_can_be_retried() {
    let (base, services) = json_services();
    let item = services
        .budgets
        .create_budget_item("Events", dec!(3000))
        .unwrap();
    let expense = services
        .expenses
        .submit_expense(item.id, dec!(640.10), "Partner meeting venue")
        .unwrap();
    let manager = services.users.register_user("Marta", "manager").unwrap();

    let snapshot = base.join(STORE_FILE);
    fs::remove_file(&snapshot).unwrap();
    fs::create_dir(&snapshot).unwrap();
    let err = services
        .expenses
        .submit_approval(expense.id, manager.id, ApprovalDecision::Approved, None)
        .unwrap_err();
    assert!(matches!(err, interreg_core::errors::CoreError::Storage(_)));

    let stored = services.expenses.expense(expense.id).unwrap();
    assert_eq!(stored.status, ExpenseStatus::Pending);
    assert!(stored.approvals.is_empty());
    assert_eq!(
        services.budgets.budget_item(item.id).unwrap().spent_amount,
        dec!(0)
    );

    fs::remove_dir(&snapshot).unwrap();
    let result = services
        .expenses
        .submit_approval(expense.id, manager.id, ApprovalDecision::Approved, None)
        .unwrap();
    assert_eq!(result.expense.status, ExpenseStatus::Approved);
    assert_eq!(result.budget_item.spent_amount, dec!(640.10));

    let reopened = reopen(&base);
    assert_eq!(
        reopened.budgets.budget_item(item.id).unwrap().spent_amount,
        dec!(640.10)
    );
    assert_eq!(
        reopened.expenses.expense(expense.id).unwrap().approvals.len(),
        1
    );
}
