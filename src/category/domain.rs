//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID};

/// Whether a category classifies income or expenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Money coming in, e.g. 'Salary'.
    Income,
    /// Money going out, e.g. 'Groceries'.
    Expense,
}

impl CategoryKind {
    /// The value stored in the database and sent in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }

    /// The capitalised name shown in tables and badges.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(Error::InvalidCategoryKind(other.to_owned())),
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A user's bucket for classifying income or expenses, e.g. 'Salary' or 'Food'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The id of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserID,
    /// The name of the category, unique per user and kind.
    pub name: CategoryName,
    /// A free text description, may be empty.
    pub description: String,
    /// Whether the category is for income or expenses. Never changes after creation.
    pub kind: CategoryKind,
}

/// A category with the number of income or expense records that use it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithUsage {
    pub category: Category,
    pub usage_count: u64,
}

/// Form data for creating a category.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NewCategoryForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
}

/// Form data for editing a category. The kind cannot be changed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EditCategoryForm {
    pub name: Option<String>,
    pub description: Option<String>,
}
