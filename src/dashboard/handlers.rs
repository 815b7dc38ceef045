//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - State and query types used by the handler

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    dashboard::{
        buckets::{
            Summary, aggregate, compute_summary, filter_by_range, generate_buckets,
            to_chart_series,
        },
        cards::summary_cards_view,
        charts::{DashboardChart, charts_script, charts_view, income_expense_chart},
        period::{Period, resolve_range},
    },
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, HeadElement, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, link,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionKind, get_all_transactions},
};

/// How many transactions the recent activity table shows.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by the dashboard handler.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
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

/// The query string for selecting the dashboard's reporting period.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// The reporting period, defaults to the current week.
    #[serde(default)]
    pub period: Period,
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_transactions(&connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?
    };

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let range = resolve_range(query.period, today);
    let filtered = filter_by_range(&transactions, range);
    let buckets = aggregate(&filtered, generate_buckets(query.period, range));
    let series = to_chart_series(&buckets);

    let summary = compute_summary(&transactions);
    let recent = &transactions[..transactions.len().min(RECENT_TRANSACTION_COUNT)];

    let charts = [DashboardChart {
        id: "income-expense-chart",
        options: income_expense_chart(&series, query.period).to_string(),
    }];

    Ok(dashboard_view(nav_bar, query.period, &summary, &charts, recent).into_response())
}

/// Renders the dashboard page when no transaction data exists.
///
/// Displays a helpful message with a link to create the first transaction.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your summary and charts will show up here once you start " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with summary cards, the income/expense
/// chart for the selected period, and recent transactions.
fn dashboard_view(
    nav_bar: NavBar,
    period: Period,
    summary: &Summary,
    charts: &[DashboardChart],
    recent_transactions: &[Transaction],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(summary))

            (period_selector(period))

            (charts_view(charts))

            (recent_transactions_view(recent_transactions))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

/// Renders the day/week/month links that switch the chart's reporting period.
fn period_selector(current: Period) -> Markup {
    html!(
        nav class="flex gap-2 mb-4" aria-label="Reporting period"
        {
            @for period in [Period::Day, Period::Week, Period::Month] {
                @let state_class = if period == current {
                    "bg-blue-500 text-white"
                } else {
                    "bg-gray-100 text-gray-700 hover:bg-gray-200
                    dark:bg-gray-800 dark:text-gray-300 dark:hover:bg-gray-700"
                };

                a
                    href={ (endpoints::DASHBOARD_VIEW) "?period=" (period.as_query_value()) }
                    data-period=(period.as_query_value())
                    aria-current=[(period == current).then_some("page")]
                    class={ "px-3 py-1.5 text-sm font-medium rounded " (state_class) }
                {
                    (period.display_name())
                }
            }
        }
    )
}

/// Renders the table of the most recent transactions.
fn recent_transactions_view(transactions: &[Transaction]) -> Markup {
    html!(
        section class="w-full mx-auto mb-4"
        {
            div class="flex items-center justify-between"
            {
                h3 class="text-xl font-semibold" { "Recent Transactions" }

                (link(endpoints::TRANSACTIONS_VIEW, "View all"))
            }

            div class="w-full overflow-x-auto"
            {
                table class="w-full my-2 text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            (recent_transaction_row(transaction))
                        }
                    }
                }
            }
        }
    )
}

fn recent_transaction_row(transaction: &Transaction) -> Markup {
    let (amount_str, amount_class) = match transaction.kind {
        TransactionKind::Income => (
            format!("+{}", format_currency(transaction.amount)),
            "text-green-700 dark:text-green-300",
        ),
        TransactionKind::Expense => (
            format!("-{}", format_currency(transaction.amount)),
            "text-red-700 dark:text-red-300",
        ),
    };

    html!(
        tr class=(TABLE_ROW_STYLE) data-recent-transaction="true"
        {
            td class={ "px-6 py-4 text-right " (amount_class) } { (amount_str) }
            td class=(TABLE_CELL_STYLE) { time datetime=(transaction.date) { (transaction.date) } }
            td class=(TABLE_CELL_STYLE)
            {
                @if transaction.category.is_empty() {
                    span class="text-gray-400 dark:text-gray-500" { "-" }
                } @else {
                    span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
        }
    )
}
