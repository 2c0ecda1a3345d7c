//! Aggregations over records for charts and breakdown tables.

use std::collections::HashMap;

use crate::{
    charts::YearMonth,
    record::{CategoryTotal, Record},
};

/// Sum `records` into one total per month in `months`.
///
/// Months without records get 0 and records outside `months` are ignored.
pub fn sum_by_month(records: &[Record], months: &[YearMonth]) -> Vec<f64> {
    let mut totals: HashMap<YearMonth, f64> = HashMap::with_capacity(months.len());

    for record in records {
        *totals.entry(YearMonth::of(record.date)).or_default() += record.amount;
    }

    months
        .iter()
        .map(|month| totals.get(month).copied().unwrap_or(0.0))
        .collect()
}

/// A category total and its share of the grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category_name: String,
    pub total: f64,
    /// Percentage of the grand total, 0 to 100.
    pub percent: f64,
}

/// The share of `grand_total` that each category makes up, keeping the input order.
pub fn category_shares(totals: &[CategoryTotal], grand_total: f64) -> Vec<CategoryShare> {
    totals
        .iter()
        .map(|total| CategoryShare {
            category_name: total.category_name.clone(),
            total: total.total,
            percent: if grand_total > 0.0 {
                total.total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
