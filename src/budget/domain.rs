//! Budget models.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID, category::CategoryId};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// How often a budget repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    /// Every period, in the order they are offered in forms.
    pub const ALL: [BudgetPeriod; 4] = [
        BudgetPeriod::Daily,
        BudgetPeriod::Weekly,
        BudgetPeriod::Monthly,
        BudgetPeriod::Yearly,
    ];

    /// The value stored in the database and sent in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Daily => "daily",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetPeriod::Daily => "Daily",
            BudgetPeriod::Weekly => "Weekly",
            BudgetPeriod::Monthly => "Monthly",
            BudgetPeriod::Yearly => "Yearly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(BudgetPeriod::Daily),
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(Error::InvalidBudgetPeriod(other.to_owned())),
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spending limit for one expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub category_id: CategoryId,
    /// The limit in dollars, always positive.
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: Date,
    /// `None` for budgets that run indefinitely.
    pub end_date: Option<Date>,
}

impl Budget {
    /// Whether the budget applies on `date`.
    pub fn is_active_on(&self, date: Date) -> bool {
        self.start_date <= date && self.end_date.is_none_or(|end_date| date <= end_date)
    }
}

/// A budget with the name of its category, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetWithCategory {
    pub budget: Budget,
    pub category_name: String,
}

/// The validated fields for creating or updating a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category_id: CategoryId,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

/// The raw values submitted in the budget form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetForm {
    pub category_id: Option<String>,
    pub amount: Option<String>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl BudgetForm {
    /// An empty monthly budget form starting on `date`.
    pub fn starting(date: Date) -> Self {
        Self {
            period: Some(BudgetPeriod::default().as_str().to_owned()),
            start_date: Some(date.to_string()),
            ..Default::default()
        }
    }
}

impl From<&Budget> for BudgetForm {
    fn from(budget: &Budget) -> Self {
        Self {
            category_id: Some(budget.category_id.to_string()),
            amount: Some(format!("{:.2}", budget.amount)),
            period: Some(budget.period.as_str().to_owned()),
            start_date: Some(budget.start_date.to_string()),
            end_date: budget.end_date.map(|date| date.to_string()),
        }
    }
}

#[cfg(test)]
mod budget_domain_tests {
    use time::macros::date;

    use crate::{Error, auth::UserID};

    use super::{Budget, BudgetForm, BudgetPeriod};

    fn budget(end_date: Option<time::Date>) -> Budget {
        Budget {
            id: 1,
            user_id: UserID::new(1),
            category_id: 2,
            amount: 300.0,
            period: BudgetPeriod::Monthly,
            start_date: date!(2025 - 01 - 01),
            end_date,
        }
    }

    #[test]
    fn parses_known_periods() {
        for period in BudgetPeriod::ALL {
            assert_eq!(period.as_str().parse::<BudgetPeriod>(), Ok(period));
        }
    }

    #[test]
    fn rejects_unknown_period() {
        assert_eq!(
            "fortnightly".parse::<BudgetPeriod>(),
            Err(Error::InvalidBudgetPeriod("fortnightly".to_owned()))
        );
    }

    #[test]
    fn open_ended_budget_is_active_after_start() {
        let budget = budget(None);

        assert!(!budget.is_active_on(date!(2024 - 12 - 31)));
        assert!(budget.is_active_on(date!(2025 - 01 - 01)));
        assert!(budget.is_active_on(date!(2030 - 06 - 01)));
    }

    #[test]
    fn budget_is_inactive_after_end_date() {
        let budget = budget(Some(date!(2025 - 03 - 31)));

        assert!(budget.is_active_on(date!(2025 - 03 - 31)));
        assert!(!budget.is_active_on(date!(2025 - 04 - 01)));
    }

    #[test]
    fn form_defaults_to_monthly() {
        let form = BudgetForm::starting(date!(2025 - 02 - 10));

        assert_eq!(form.period.as_deref(), Some("monthly"));
        assert_eq!(form.start_date.as_deref(), Some("2025-02-10"));
        assert_eq!(form.end_date, None);
    }
}
