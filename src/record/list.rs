//! The income and expenses pages: add form, total, monthly chart, category
//! breakdown and the table of records.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, get_categories_by_kind},
    charts::{PageChart, charts_script, charts_view, monthly_bar_chart, recent_months},
    endpoints,
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles, echarts_script,
        edit_delete_action_links, format_currency, format_date, truncate_description,
    },
    navigation::NavBar,
    record::{
        RecordForm, RecordKind, RecordWithCategory,
        db::{get_records_in_date_range, get_records_with_category, get_total, get_totals_by_category},
        form::{RecordFormTarget, record_form},
        summary::{CategoryShare, category_shares, sum_by_month},
    },
    timezone::local_today,
};

/// How many months the chart on the income and expenses pages covers.
const CHART_MONTHS: usize = 6;

/// The state needed for the income and expenses pages.
#[derive(Debug, Clone)]
pub struct RecordsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the income page.
pub async fn get_income_page(
    State(state): State<RecordsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    records_page(RecordKind::Income, &state, user_id)
}

/// Render the expenses page.
pub async fn get_expenses_page(
    State(state): State<RecordsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    records_page(RecordKind::Expense, &state, user_id)
}

struct RecordsPageData {
    categories: Vec<Category>,
    records: Vec<RecordWithCategory>,
    total: f64,
    breakdown: Vec<CategoryShare>,
    chart: PageChart,
}

fn records_page(
    kind: RecordKind,
    state: &RecordsPageState,
    user_id: UserID,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories_by_kind(user_id, kind.category_kind(), &connection)
        .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?;
    let records = get_records_with_category(kind, user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get {} records: {error}", kind.table()))?;
    let total = get_total(kind, user_id, &connection)?;
    let totals_by_category = get_totals_by_category(kind, user_id, &connection)?;

    let months = recent_months(today, CHART_MONTHS);
    let chart_start = months.first().map(|month| month.first_day()).unwrap_or(today);
    let chart_records =
        get_records_in_date_range(kind, user_id, chart_start, today, &connection)?;
    let labels = months.iter().map(|month| month.label_with_year()).collect();
    let values = sum_by_month(&chart_records, &months);

    let chart = PageChart::new(
        chart_id(kind),
        monthly_bar_chart(
            &format!("Monthly {}", kind.plural_label()),
            "Last six months",
            labels,
            values,
        ),
    );

    let data = RecordsPageData {
        categories,
        records,
        total,
        breakdown: category_shares(&totals_by_category, total),
        chart,
    };

    Ok(records_view(kind, &data, &RecordForm::dated(today)).into_response())
}

fn chart_id(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Income => "monthly-income-chart",
        RecordKind::Expense => "monthly-expenses-chart",
    }
}

fn records_view(kind: RecordKind, data: &RecordsPageData, form_values: &RecordForm) -> Markup {
    let nav_bar = NavBar::new(kind.list_view()).into_html();
    let charts = std::slice::from_ref(&data.chart);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                h1 class="text-xl font-bold" { (kind.plural_label()) }

                div class=(CARD_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Total " (kind.plural_label())
                    }

                    p class="text-2xl font-semibold" data-total="true"
                    {
                        (format_currency(data.total))
                    }
                }

                div class=(CARD_STYLE)
                {
                    h2 class="text-lg font-semibold mb-4" { "Add " (kind.label()) }

                    (record_form(kind, RecordFormTarget::Create, &data.categories, form_values, None))
                }

                (charts_view(charts))

                (breakdown_table(kind, &data.breakdown))

                (records_table(kind, &data.records))
            }
        }
    );

    base(
        kind.plural_label(),
        &[
            dollar_input_styles(),
            echarts_script(),
            charts_script(charts),
        ],
        &content,
    )
}

fn breakdown_table(kind: RecordKind, breakdown: &[CategoryShare]) -> Markup {
    html!(
        section class="overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { (kind.plural_label()) " by Category" }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                    }
                }

                tbody
                {
                    @for share in breakdown {
                        tr class=(TABLE_ROW_STYLE) data-breakdown-row="true"
                        {
                            td class=(TABLE_CELL_STYLE) { (share.category_name) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(share.total)) }
                            td class=(TABLE_CELL_STYLE) { (format!("{:.1}%", share.percent)) }
                        }
                    }

                    @if breakdown.is_empty() {
                        tr
                        {
                            td colspan="3" class="px-6 py-4 text-center" { "Nothing to show yet." }
                        }
                    }
                }
            }
        }
    )
}

fn records_table(kind: RecordKind, records: &[RecordWithCategory]) -> Markup {
    let table_row = |item: &RecordWithCategory| {
        let record = &item.record;
        let edit_url = endpoints::format_endpoint(kind.edit_view(), record.id);
        let delete_url = endpoints::format_endpoint(kind.record_endpoint(), record.id);
        let confirm_message = format!(
            "Are you sure you want to delete this {}?",
            kind.label().to_lowercase()
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-record-row="true"
            {
                td class=(TABLE_CELL_STYLE) { (format_date(record.date)) }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (item.category_name) }
                }

                td class=(TABLE_CELL_STYLE) title=(record.description)
                {
                    (truncate_description(&record.description))
                }

                td class="px-6 py-4 text-right" { (format_currency(record.amount)) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    html!(
        section class="overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { "All " (kind.plural_label()) }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for item in records {
                        (table_row(item))
                    }

                    @if records.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No " (kind.plural_label().to_lowercase()) " recorded yet."
                            }
                        }
                    }
                }
            }
        }
    )
}
