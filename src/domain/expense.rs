use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExpenseStatus::Pending)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseStatus::Pending => "PENDING",
            ExpenseStatus::Approved => "APPROVED",
            ExpenseStatus::Rejected => "REJECTED",
        };
        f.write_str(label)
    }
}

/// One approver's verdict on an expense.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

impl ApprovalDecision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" => Some(ApprovalDecision::Approved),
            "reject" | "rejected" => Some(ApprovalDecision::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalDecision::Approved => f.write_str("APPROVED"),
            ApprovalDecision::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// Append-only record of a single approver's decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseApproval {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub approver_id: Uuid,
    pub approver_level: u8,
    pub status: ApprovalDecision,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    pub decided_at: DateTime<Utc>,
}

impl ExpenseApproval {
    pub fn new(
        expense_id: Uuid,
        approver_id: Uuid,
        approver_level: u8,
        status: ApprovalDecision,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            approver_id,
            approver_level,
            status,
            comment: comment.filter(|text| !text.trim().is_empty()),
            approved_at: (status == ApprovalDecision::Approved).then_some(at),
            decided_at: at,
        }
    }
}

/// A request to spend against a budget item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub budget_item_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub status: ExpenseStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub approvals: Vec<ExpenseApproval>,
}

impl Expense {
    pub fn new(budget_item_id: Uuid, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_item_id,
            amount,
            description: description.into(),
            status: ExpenseStatus::Pending,
            submitted_at: Utc::now(),
            approvals: Vec::new(),
        }
    }

    pub fn approval_by(&self, approver_id: Uuid) -> Option<&ExpenseApproval> {
        self.approvals
            .iter()
            .find(|approval| approval.approver_id == approver_id)
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn approved_at_is_set_only_for_approvals() {
        let now = Utc::now();
        let approved = ExpenseApproval::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            3,
            ApprovalDecision::Approved,
            None,
            now,
        );
        let rejected = ExpenseApproval::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            1,
            ApprovalDecision::Rejected,
            Some("   ".into()),
            now,
        );
        assert_eq!(approved.approved_at, Some(now));
        assert_eq!(rejected.approved_at, None);
        assert_eq!(rejected.comment, None);
    }

    #[test]
    fn expense_serializes_with_camel_case_fields() {
        let expense = Expense::new(Uuid::new_v4(), dec!(12.50), "Printing");
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert!(json.get("budgetItemId").is_some());
    }
}
