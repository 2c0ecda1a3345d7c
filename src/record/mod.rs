//! Income and expense records.
//!
//! Both kinds share the same columns, forms and pages. [RecordKind] picks the
//! table, the endpoints and the kind of category a record may use.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod summary;

pub use create::{create_expense_endpoint, create_income_endpoint};
pub use db::{
    create_record, create_record_tables, delete_record, get_category_total_in_range, get_record,
    get_records_in_date_range, get_records_with_category, get_total, get_totals_by_category,
    update_record,
};
pub use delete::{delete_expense_endpoint, delete_income_endpoint};
pub use domain::{
    CategoryTotal, NewRecord, Record, RecordForm, RecordId, RecordKind, RecordWithCategory,
};
pub use edit::{
    get_edit_expense_page, get_edit_income_page, update_expense_endpoint, update_income_endpoint,
};
pub use list::{get_expenses_page, get_income_page};
pub use summary::{CategoryShare, category_shares, sum_by_month};
