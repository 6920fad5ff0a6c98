//! Approval rules: role to level lookup and aggregate status resolution.

use std::collections::HashMap;

use crate::config::Config;
use crate::domain::{ApprovalDecision, ExpenseApproval, ExpenseStatus};

/// Lowest approver level whose approval settles an expense on its own.
pub const APPROVAL_THRESHOLD_LEVEL: u8 = 3;

/// Maps role names (case-insensitive) to approver levels.
#[derive(Debug, Clone)]
pub struct ApproverLevels {
    levels: HashMap<String, u8>,
}

impl ApproverLevels {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u8)>,
        S: AsRef<str>,
    {
        Self {
            levels: entries
                .into_iter()
                .map(|(role, level)| (normalize(role.as_ref()), level))
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config
                .approver_levels
                .iter()
                .map(|(role, level)| (role.as_str(), *level)),
        )
    }

    pub fn level_for(&self, role: &str) -> Option<u8> {
        self.levels.get(&normalize(role)).copied()
    }

    pub fn roles(&self) -> impl Iterator<Item = (&str, u8)> {
        self.levels.iter().map(|(role, level)| (role.as_str(), *level))
    }
}

impl Default for ApproverLevels {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn normalize(role: &str) -> String {
    role.trim().to_ascii_lowercase()
}

/// Aggregate status implied by a set of recorded approvals.
///
/// Any rejection vetoes. Otherwise one approval at or above
/// [`APPROVAL_THRESHOLD_LEVEL`] approves. Anything else stays pending.
pub fn resolve_status(approvals: &[ExpenseApproval]) -> ExpenseStatus {
    if approvals
        .iter()
        .any(|approval| approval.status == ApprovalDecision::Rejected)
    {
        return ExpenseStatus::Rejected;
    }
    if approvals.iter().any(|approval| {
        approval.status == ApprovalDecision::Approved
            && approval.approver_level >= APPROVAL_THRESHOLD_LEVEL
    }) {
        return ExpenseStatus::Approved;
    }
    ExpenseStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn decision(level: u8, status: ApprovalDecision) -> ExpenseApproval {
        ExpenseApproval::new(Uuid::nil(), Uuid::new_v4(), level, status, None, Utc::now())
    }

    #[test]
    fn default_table_maps_contributors_and_managers() {
        let levels = ApproverLevels::default();
        assert_eq!(levels.level_for("Contributor"), Some(1));
        assert_eq!(levels.level_for(" ADMIN "), Some(3));
        assert_eq!(levels.level_for("auditor"), None);
    }

    #[test]
    fn single_low_level_approval_stays_pending() {
        let approvals = [decision(1, ApprovalDecision::Approved)];
        assert_eq!(resolve_status(&approvals), ExpenseStatus::Pending);
    }

    #[test]
    fn high_level_approval_settles() {
        let approvals = [
            decision(1, ApprovalDecision::Approved),
            decision(3, ApprovalDecision::Approved),
        ];
        assert_eq!(resolve_status(&approvals), ExpenseStatus::Approved);
    }

    #[test]
    fn any_rejection_vetoes_regardless_of_order() {
        let approvals = [
            decision(3, ApprovalDecision::Approved),
            decision(1, ApprovalDecision::Rejected),
        ];
        assert_eq!(resolve_status(&approvals), ExpenseStatus::Rejected);
        assert_eq!(resolve_status(&[]), ExpenseStatus::Pending);
    }
}
