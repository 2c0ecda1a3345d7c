//! The recent transactions table.

use maud::{Markup, html};

use crate::{
    dashboard::transaction::RecentTransaction,
    html::{
        CATEGORY_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency, format_date, truncate_description,
    },
    record::RecordKind,
};

const TABLE_CELL_GREEN_STYLE: &str = "px-6 py-4 text-right text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "px-6 py-4 text-right text-red-600 dark:text-red-400";

/// Format an amount with an explicit sign, e.g. "+$10.00" or "-$4.50".
fn format_signed_currency(amount: f64) -> String {
    if amount > 0.0 {
        format!("+{}", format_currency(amount))
    } else {
        format_currency(amount)
    }
}

fn amount_style(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Income => TABLE_CELL_GREEN_STYLE,
        RecordKind::Expense => TABLE_CELL_RED_STYLE,
    }
}

pub(super) fn recent_transactions_table(transactions: &[RecentTransaction]) -> Markup {
    html! {
        section class="w-full overflow-x-auto"
        {
            h3 class="text-xl font-semibold mb-4" { "Recent Transactions" }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE) data-recent-row="true"
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.kind.label()) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class=(CATEGORY_BADGE_STYLE) { (transaction.category_name) }
                            }
                            td class=(TABLE_CELL_STYLE) title=(transaction.description)
                            {
                                (truncate_description(&transaction.description))
                            }
                            td class=(TABLE_CELL_STYLE) { (format_date(transaction.date)) }
                            td class=(amount_style(transaction.kind))
                            {
                                (format_signed_currency(transaction.signed_amount()))
                            }
                        }
                    }
                }
            }
        }
    }
}
