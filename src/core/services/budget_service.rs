//! Budget items and the spend figures derived from their expenses.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{BudgetItem, ExpenseStatus};
use crate::errors::{CoreError, Result};
use crate::storage::BudgetRepository;

/// Point-in-time view of one budget item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub item: BudgetItem,
    pub remaining: Decimal,
    /// `None` when nothing was planned.
    pub utilization_percent: Option<Decimal>,
    /// Sum of expenses still awaiting a decision.
    pub pending_exposure: Decimal,
    pub pending_count: usize,
    pub approved_total: Decimal,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub over_budget: bool,
}

pub struct BudgetService {
    budgets: Arc<dyn BudgetRepository>,
}

impl BudgetService {
    pub fn new(budgets: Arc<dyn BudgetRepository>) -> Self {
        Self { budgets }
    }

    pub fn create_budget_item(
        &self,
        name: impl Into<String>,
        planned_amount: Decimal,
    ) -> Result<BudgetItem> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("budget item name must not be empty".into()));
        }
        if planned_amount < Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "planned amount must not be negative, got {planned_amount}"
            )));
        }
        let item = self
            .budgets
            .insert_budget_item(BudgetItem::new(name, planned_amount))?;
        tracing::info!(budget_item_id = %item.id, planned = %item.planned_amount, "created budget item");
        Ok(item)
    }

    pub fn budget_item(&self, id: Uuid) -> Result<BudgetItem> {
        self.budgets
            .budget_item(id)?
            .ok_or_else(|| CoreError::not_found("BudgetItem", id))
    }

    pub fn budget_items(&self) -> Result<Vec<BudgetItem>> {
        self.budgets.budget_items()
    }

    pub fn status(&self, id: Uuid) -> Result<BudgetStatus> {
        let item = self.budget_item(id)?;
        let expenses = self.budgets.expenses_for_item(id)?;

        let mut status = BudgetStatus {
            remaining: item.remaining(),
            utilization_percent: utilization(&item),
            pending_exposure: Decimal::ZERO,
            pending_count: 0,
            approved_total: Decimal::ZERO,
            approved_count: 0,
            rejected_count: 0,
            over_budget: item.spent_amount > item.planned_amount,
            item,
        };
        for expense in &expenses {
            match expense.status {
                ExpenseStatus::Pending => {
                    status.pending_exposure += expense.amount;
                    status.pending_count += 1;
                }
                ExpenseStatus::Approved => {
                    status.approved_total += expense.amount;
                    status.approved_count += 1;
                }
                ExpenseStatus::Rejected => status.rejected_count += 1,
            }
        }
        Ok(status)
    }
}

fn utilization(item: &BudgetItem) -> Option<Decimal> {
    if item.planned_amount.is_zero() {
        return None;
    }
    Some((item.spent_amount / item.planned_amount * Decimal::ONE_HUNDRED).round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Expense;
    use crate::storage::MemoryStore;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_plan_is_rejected() {
        let service = BudgetService::new(Arc::new(MemoryStore::new()));
        let err = service.create_budget_item("Travel", dec!(-1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn status_splits_expenses_by_state() {
        let store = Arc::new(MemoryStore::new());
        let service = BudgetService::new(store.clone());
        let item = service.create_budget_item("Travel", dec!(800)).unwrap();
        store.increment_spent(item.id, dec!(200)).unwrap();

        let mut approved = Expense::new(item.id, dec!(200), "Flights");
        approved.status = ExpenseStatus::Approved;
        store.insert_expense(approved).unwrap();
        store
            .insert_expense(Expense::new(item.id, dec!(75.50), "Hotel"))
            .unwrap();

        let status = service.status(item.id).unwrap();
        assert_eq!(status.remaining, dec!(600));
        assert_eq!(status.utilization_percent, Some(dec!(25)));
        assert_eq!(status.pending_exposure, dec!(75.50));
        assert_eq!(status.approved_total, dec!(200));
        assert_eq!((status.pending_count, status.approved_count), (1, 1));
        assert!(!status.over_budget);
    }

    #[test]
    fn zero_plan_has_no_utilization() {
        let service = BudgetService::new(Arc::new(MemoryStore::new()));
        let item = service.create_budget_item("Reserve", Decimal::ZERO).unwrap();
        assert_eq!(service.status(item.id).unwrap().utilization_percent, None);
    }
}
