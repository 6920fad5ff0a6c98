use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, NamedEntity};

/// A line of planned spend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Uuid,
    pub name: String,
    pub planned_amount: Decimal,
    #[serde(default)]
    pub spent_amount: Decimal,
}

impl BudgetItem {
    pub fn new(name: impl Into<String>, planned_amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            planned_amount,
            spent_amount: Decimal::ZERO,
        }
    }

    pub fn remaining(&self) -> Decimal {
        self.planned_amount - self.spent_amount
    }

    /// Amount by which spending `requested` on top of the current spend overshoots the plan.
    pub fn shortfall_for(&self, requested: Decimal) -> Option<Decimal> {
        let projected = self.spent_amount + requested;
        (projected > self.planned_amount).then(|| projected - self.planned_amount)
    }
}

impl Identifiable for BudgetItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for BudgetItem {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn shortfall_only_when_plan_is_exceeded() {
        let mut item = BudgetItem::new("Travel", dec!(1000));
        item.spent_amount = dec!(600);
        assert_eq!(item.shortfall_for(dec!(500)), Some(dec!(100)));
        assert_eq!(item.shortfall_for(dec!(400)), None);
        assert_eq!(item.remaining(), dec!(400));
    }
}
