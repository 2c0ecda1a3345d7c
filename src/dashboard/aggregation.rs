//! Totals and month-by-month sums shown on the dashboard.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    charts::{YearMonth, recent_months},
    record::{CategoryTotal, RecordKind, get_records_in_date_range, sum_by_month},
};

/// The user's all-time income and expenses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct DashboardTotals {
    pub income: f64,
    pub expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// The share of income not spent, as a percentage. Zero without income.
    pub savings_rate: f64,
}

impl DashboardTotals {
    pub fn new(income: f64, expenses: f64) -> Self {
        let balance = income - expenses;
        let savings_rate = if income > 0.0 {
            balance / income * 100.0
        } else {
            0.0
        };

        Self {
            income,
            expenses,
            balance,
            savings_rate,
        }
    }
}

/// Income and expense totals for each of the last `count` months up to `today`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct MonthlyTotals {
    /// Short month names, oldest first, e.g. "Jan".
    pub labels: Vec<String>,
    pub income: Vec<f64>,
    pub expenses: Vec<f64>,
}

pub(super) fn get_monthly_totals(
    user_id: UserID,
    today: Date,
    count: usize,
    connection: &Connection,
) -> Result<MonthlyTotals, Error> {
    let months = recent_months(today, count);
    let start = months.first().map(YearMonth::first_day).unwrap_or(today);

    let sum_for = |kind: RecordKind| -> Result<Vec<f64>, Error> {
        let records = get_records_in_date_range(kind, user_id, start, today, connection)?;
        Ok(sum_by_month(&records, &months))
    };

    Ok(MonthlyTotals {
        labels: months.iter().map(YearMonth::short_label).collect(),
        income: sum_for(RecordKind::Income)?,
        expenses: sum_for(RecordKind::Expense)?,
    })
}

/// Name and amount pairs for a pie chart.
pub(super) fn pie_chart_data(totals: &[CategoryTotal]) -> Vec<(String, f64)> {
    totals
        .iter()
        .map(|total| (total.category_name.clone(), total.total))
        .collect()
}
