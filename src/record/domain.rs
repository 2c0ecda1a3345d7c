//! Income and expense record models.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    auth::UserID,
    category::{CategoryId, CategoryKind},
    endpoints,
};

/// Database identifier for an income or expense record.
pub type RecordId = i64;

/// Whether a record is money earned or money spent.
///
/// Income and expenses live in separate tables with identical columns, so
/// the kind selects the table, the pages and the category kind to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    /// The table the records are stored in.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
        }
    }

    /// Records may only use categories of this kind.
    pub fn category_kind(&self) -> CategoryKind {
        match self {
            RecordKind::Income => CategoryKind::Income,
            RecordKind::Expense => CategoryKind::Expense,
        }
    }

    /// Singular name, e.g. for "Add Expense".
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Income => "Income",
            RecordKind::Expense => "Expense",
        }
    }

    /// Page heading, e.g. "Expenses".
    pub fn plural_label(&self) -> &'static str {
        match self {
            RecordKind::Income => "Income",
            RecordKind::Expense => "Expenses",
        }
    }

    pub fn list_view(&self) -> &'static str {
        match self {
            RecordKind::Income => endpoints::INCOME_VIEW,
            RecordKind::Expense => endpoints::EXPENSES_VIEW,
        }
    }

    pub fn edit_view(&self) -> &'static str {
        match self {
            RecordKind::Income => endpoints::EDIT_INCOME_VIEW,
            RecordKind::Expense => endpoints::EDIT_EXPENSE_VIEW,
        }
    }

    pub fn create_endpoint(&self) -> &'static str {
        match self {
            RecordKind::Income => endpoints::POST_INCOME,
            RecordKind::Expense => endpoints::POST_EXPENSE,
        }
    }

    /// The endpoint for updating or deleting a single record.
    pub fn record_endpoint(&self) -> &'static str {
        match self {
            RecordKind::Income => endpoints::INCOME_RECORD,
            RecordKind::Expense => endpoints::EXPENSE_RECORD,
        }
    }
}

/// A single income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub user_id: UserID,
    pub category_id: CategoryId,
    /// The amount in dollars, always positive.
    pub amount: f64,
    pub description: String,
    pub date: Date,
}

/// A record with the name of its category, for display in tables.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordWithCategory {
    pub record: Record,
    pub category_name: String,
}

/// The validated fields for creating or updating a record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub category_id: CategoryId,
    pub amount: f64,
    pub description: String,
    pub date: Date,
}

/// The total amount recorded against one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category_id: CategoryId,
    pub category_name: String,
    pub total: f64,
}

/// The raw values submitted in the record form.
///
/// Every field is kept as text so that invalid input can be shown back to
/// the user unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordForm {
    pub amount: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl RecordForm {
    /// An empty form dated `date`.
    pub fn dated(date: Date) -> Self {
        Self {
            date: Some(date.to_string()),
            ..Default::default()
        }
    }
}

impl From<&Record> for RecordForm {
    fn from(record: &Record) -> Self {
        Self {
            amount: Some(format!("{:.2}", record.amount)),
            category_id: Some(record.category_id.to_string()),
            description: Some(record.description.clone()),
            date: Some(record.date.to_string()),
        }
    }
}
