//! Summary cards showing the user's overall balance, income, and expenses.

use maud::{Markup, html};

use crate::{dashboard::buckets::Summary, html::format_currency};

/// Renders the three summary cards at the top of the dashboard.
///
/// The totals cover the user's full transaction history, not just the
/// selected reporting period.
pub(super) fn summary_cards_view(summary: &Summary) -> Markup {
    let balance_color = if summary.balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4" {
                (summary_card("Balance", summary.balance, balance_color))
                (summary_card(
                    "Income",
                    summary.total_income,
                    "text-green-600 dark:text-green-400",
                ))
                (summary_card(
                    "Expenses",
                    summary.total_expenses,
                    "text-red-600 dark:text-red-400",
                ))
            }
        }
    }
}

fn summary_card(title: &str, amount: f64, amount_color: &str) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
            data-summary-card=(title.to_lowercase())
        {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-1" {
                (title)
            }

            div class={ "text-3xl font-bold " (amount_color) } {
                (format_currency(amount))
            }
        }
    }
}
