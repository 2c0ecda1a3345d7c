//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{BudgetProgress, BudgetWithCategory, budget_progress, get_active_budgets},
    charts::{PageChart, category_pie_chart, charts_script, charts_view, income_expense_chart},
    dashboard::{
        aggregation::{DashboardTotals, get_monthly_totals, pie_chart_data},
        cards::{budget_overview_view, summary_cards_view},
        tables::recent_transactions_table,
        transaction::{RecentTransaction, get_recent_transactions},
    },
    endpoints,
    html::{base, echarts_script, empty_state, link},
    navigation::NavBar,
    record::{RecordKind, get_total, get_totals_by_category},
    timezone::local_today,
};

/// How many months the income vs expenses chart covers.
const CHART_MONTHS: usize = 12;

/// How many records are listed under recent transactions.
const RECENT_TRANSACTIONS_LIMIT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything rendered on the dashboard.
struct DashboardData {
    totals: DashboardTotals,
    charts: Vec<PageChart>,
    recent_transactions: Vec<RecentTransaction>,
    budgets: Vec<(BudgetWithCategory, BudgetProgress)>,
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(user_id, today, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, &data).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar).into_response()),
    }
}

/// Gather the dashboard data, or `None` if the user has no records.
fn build_dashboard_data(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let recent_transactions =
        get_recent_transactions(user_id, RECENT_TRANSACTIONS_LIMIT, connection)
            .inspect_err(|error| tracing::error!("Could not get recent transactions: {error}"))?;

    if recent_transactions.is_empty() {
        return Ok(None);
    }

    let totals = DashboardTotals::new(
        get_total(RecordKind::Income, user_id, connection)?,
        get_total(RecordKind::Expense, user_id, connection)?,
    );

    let monthly = get_monthly_totals(user_id, today, CHART_MONTHS, connection)
        .inspect_err(|error| tracing::error!("Could not get monthly totals: {error}"))?;
    let expense_totals = get_totals_by_category(RecordKind::Expense, user_id, connection)?;
    let income_totals = get_totals_by_category(RecordKind::Income, user_id, connection)?;

    let mut charts = vec![PageChart::new(
        "income-expense-chart",
        income_expense_chart(monthly.labels, monthly.income, monthly.expenses),
    )];

    if !expense_totals.is_empty() {
        charts.push(PageChart::new(
            "expense-breakdown-chart",
            category_pie_chart("Expenses by Category", &pie_chart_data(&expense_totals)),
        ));
    }

    if !income_totals.is_empty() {
        charts.push(PageChart::new(
            "income-breakdown-chart",
            category_pie_chart("Income by Category", &pie_chart_data(&income_totals)),
        ));
    }

    let budgets = get_active_budgets(user_id, today, connection)
        .inspect_err(|error| tracing::error!("Could not get active budgets: {error}"))?
        .into_iter()
        .map(|item| {
            budget_progress(&item.budget, today, connection).map(|progress| (item, progress))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(DashboardData {
        totals,
        charts,
        recent_transactions,
        budgets,
    }))
}

fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let message = html! {
        "Your summary will show up here once you add some "
        (link(endpoints::INCOME_VIEW, "income"))
        " or "
        (link(endpoints::EXPENSES_VIEW, "expenses"))
        "."
    };

    let content = html!(
        (nav_bar)
        (empty_state("Nothing here yet...", &message))
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center gap-8 px-2 lg:px-6 py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&data.totals))

            (charts_view(&data.charts))

            (recent_transactions_table(&data.recent_transactions))

            (budget_overview_view(&data.budgets))
        }
    );

    base(
        "Dashboard",
        &[echarts_script(), charts_script(&data.charts)],
        &content,
    )
}

#[cfg(test)]
mod dashboard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        budget::{BudgetPeriod, NewBudget, create_budget},
        category::CategoryKind,
        test_utils::{
            assert_valid_html, get_test_connection, insert_test_category, insert_test_record_on,
            insert_test_user, parse_html_document,
        },
    };

    use super::{DashboardState, get_dashboard_page};

    fn count(html: &Html, selector: &str) -> usize {
        html.select(&Selector::parse(selector).unwrap()).count()
    }

    fn summary(html: &Html, key: &str) -> String {
        html.select(&Selector::parse(&format!("[data-summary={key}]")).unwrap())
            .next()
            .unwrap()
            .text()
            .collect()
    }

    #[tokio::test]
    async fn shows_empty_state_without_records() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(count(&html, "#dashboard-content"), 0);
        assert_eq!(count(&html, "p a[href='/income']"), 1);
        assert_eq!(count(&html, "p a[href='/expenses']"), 1);
    }

    #[tokio::test]
    async fn shows_totals_charts_recent_transactions_and_budgets() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let salary = insert_test_category(&connection, user_id, "Salary", CategoryKind::Income);
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);
        let today = OffsetDateTime::now_utc().date();
        for day in 0..6 {
            insert_test_record_on(
                &connection,
                user_id,
                "expense",
                food,
                10.0,
                today - Duration::days(day),
            );
        }
        insert_test_record_on(&connection, user_id, "income", salary, 240.0, today);
        create_budget(
            user_id,
            NewBudget {
                category_id: food,
                amount: 100.0,
                period: BudgetPeriod::Monthly,
                start_date: today - Duration::days(30),
                end_date: None,
            },
            &connection,
        )
        .unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(summary(&html, "income"), "$240.00");
        assert_eq!(summary(&html, "expenses"), "$60.00");
        assert_eq!(summary(&html, "balance"), "$180.00");
        assert_eq!(summary(&html, "savings-rate"), "75.0%");
        assert_eq!(count(&html, "#income-expense-chart"), 1);
        assert_eq!(count(&html, "#expense-breakdown-chart"), 1);
        assert_eq!(count(&html, "#income-breakdown-chart"), 1);
        assert_eq!(count(&html, "tr[data-recent-row]"), 5);
        assert_eq!(count(&html, "[data-budget-overview]"), 1);
    }

    #[tokio::test]
    async fn hides_other_users_data() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let other_user = insert_test_user(&connection, "john@example.com");
        let food = insert_test_category(&connection, other_user, "Food", CategoryKind::Expense);
        insert_test_record_on(
            &connection,
            other_user,
            "expense",
            food,
            10.0,
            OffsetDateTime::now_utc().date(),
        );
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(count(&html, "#dashboard-content"), 0);
    }
}
