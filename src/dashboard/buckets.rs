//! The transaction bucketing pipeline behind the dashboard chart.
//!
//! The pipeline is a chain of pure functions invoked once per request:
//! raw transaction list -> filtered subset -> bucketed sums -> chart-ready
//! series. No step mutates its input or touches the database.

use time::{Date, Duration, Month, Weekday};

use crate::{
    dashboard::period::{DateRange, Period},
    transaction::{Transaction, TransactionKind},
};

/// A single slot on the chart's time axis.
///
/// The sequence of buckets is fully determined by the period and the current
/// date. A bucket with no matching transactions keeps zero sums.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Bucket {
    /// The x-axis label shown on the chart, e.g. "Mon 18".
    pub label: String,
    /// The calendar date transactions are matched against.
    pub key: Date,
    /// The sum of income amounts dated on `key`.
    pub income: f64,
    /// The sum of expense amounts dated on `key`.
    pub expense: f64,
}

/// The parallel arrays consumed by the chart: one label and one value per
/// series for each bucket, in bucket order.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ChartSeries {
    /// The x-axis labels.
    pub labels: Vec<String>,
    /// The income sum per bucket.
    pub income: Vec<f64>,
    /// The expense sum per bucket.
    pub expense: Vec<f64>,
}

/// Totals over the user's full transaction history, shown on the summary
/// cards. Computed over the unfiltered list, not the selected period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Summary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// Retain the transactions dated within `range`, inclusive at both ends.
///
/// Preserves the input order. An empty result is a valid state, not an error.
pub(super) fn filter_by_range(transactions: &[Transaction], range: DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| range.start <= transaction.date && transaction.date <= range.end)
        .cloned()
        .collect()
}

/// Produce the ordered, zero-sum bucket sequence for `period`.
///
/// This defines the chart's x-axis independent of the transaction data:
/// - day: a single bucket labeled "Today".
/// - week: seven buckets, Monday through Sunday, labeled "Mon 18".
/// - month: one bucket per calendar day, labeled "Mar 01".
pub(super) fn generate_buckets(period: Period, range: DateRange) -> Vec<Bucket> {
    match period {
        Period::Day => vec![Bucket {
            label: "Today".to_owned(),
            key: range.start,
            income: 0.0,
            expense: 0.0,
        }],
        Period::Week => dates_in(range)
            .map(|date| Bucket {
                label: format!("{} {}", short_weekday(date.weekday()), date.day()),
                key: date,
                income: 0.0,
                expense: 0.0,
            })
            .collect(),
        Period::Month => dates_in(range)
            .map(|date| Bucket {
                label: format!("{} {:02}", short_month(date.month()), date.day()),
                key: date,
                income: 0.0,
                expense: 0.0,
            })
            .collect(),
    }
}

/// Fold `transactions` into per-bucket income and expense sums.
///
/// Every bucket starts from zero sums. Each transaction is matched to the
/// bucket whose key equals its date; a transaction that matches no bucket is
/// left out of the chart rather than failing the whole page, which can happen
/// at period boundaries.
pub(super) fn aggregate(transactions: &[Transaction], mut buckets: Vec<Bucket>) -> Vec<Bucket> {
    for bucket in &mut buckets {
        bucket.income = 0.0;
        bucket.expense = 0.0;
    }

    for transaction in transactions {
        let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| bucket.key == transaction.date)
        else {
            continue;
        };

        match transaction.kind {
            TransactionKind::Income => bucket.income += transaction.amount,
            TransactionKind::Expense => bucket.expense += transaction.amount,
        }
    }

    buckets
}

/// Transpose the bucket sequence into the parallel arrays the chart consumes.
pub(super) fn to_chart_series(buckets: &[Bucket]) -> ChartSeries {
    ChartSeries {
        labels: buckets.iter().map(|bucket| bucket.label.clone()).collect(),
        income: buckets.iter().map(|bucket| bucket.income).collect(),
        expense: buckets.iter().map(|bucket| bucket.expense).collect(),
    }
}

/// Sum the full transaction history into the summary card totals.
pub(super) fn compute_summary(transactions: &[Transaction]) -> Summary {
    let (total_income, total_expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), transaction| {
                match transaction.kind {
                    TransactionKind::Income => (income + transaction.amount, expenses),
                    TransactionKind::Expense => (income, expenses + transaction.amount),
                }
            });

    Summary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    }
}

fn dates_in(range: DateRange) -> impl Iterator<Item = Date> {
    let day_count = (range.end - range.start).whole_days() + 1;

    (0..day_count).map(move |offset| range.start + Duration::days(offset))
}

fn short_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

fn short_month(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::date};

    use crate::{
        dashboard::period::{DateRange, Period, resolve_range},
        transaction::{Transaction, TransactionKind},
    };

    use super::{
        aggregate, compute_summary, filter_by_range, generate_buckets, to_chart_series,
    };

    fn transaction(amount: f64, date: time::Date, kind: TransactionKind) -> Transaction {
        Transaction {
            id: 0,
            date,
            amount,
            kind,
            category: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn buckets_cover_the_full_range_with_no_gaps() {
        // 2024-03-20 is a Wednesday.
        let today = date!(2024 - 03 - 20);

        for period in [Period::Day, Period::Week, Period::Month] {
            let range = resolve_range(period, today);
            let buckets = generate_buckets(period, range);

            assert!(!buckets.is_empty(), "{period:?} produced no buckets");
            assert_eq!(
                buckets.first().unwrap().key,
                range.start,
                "{period:?} buckets should start at the range start"
            );

            for pair in buckets.windows(2) {
                assert_eq!(
                    pair[1].key - pair[0].key,
                    Duration::days(1),
                    "{period:?} buckets should be consecutive days"
                );
            }

            assert_eq!(
                buckets.last().unwrap().key,
                range.end,
                "{period:?} buckets should end at the range end"
            );
        }
    }

    #[test]
    fn day_period_has_a_single_today_bucket() {
        let today = date!(2024 - 03 - 20);
        let buckets = generate_buckets(Period::Day, resolve_range(Period::Day, today));

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "Today");
        assert_eq!(buckets[0].key, today);
    }

    #[test]
    fn week_buckets_have_short_weekday_labels() {
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));
        let buckets = generate_buckets(Period::Week, range);

        let labels: Vec<&str> = buckets.iter().map(|bucket| bucket.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Mon 18", "Tue 19", "Wed 20", "Thu 21", "Fri 22", "Sat 23", "Sun 24"]
        );
    }

    #[test]
    fn month_buckets_have_short_date_labels() {
        let range = resolve_range(Period::Month, date!(2024 - 03 - 20));
        let buckets = generate_buckets(Period::Month, range);

        assert_eq!(buckets.len(), 31);
        assert_eq!(buckets[0].label, "Mar 01");
        assert_eq!(buckets[30].label, "Mar 31");
    }

    #[test]
    fn aggregating_no_transactions_zero_fills_every_bucket() {
        let range = resolve_range(Period::Month, date!(2024 - 03 - 20));
        let buckets = aggregate(&[], generate_buckets(Period::Month, range));

        for bucket in &buckets {
            assert_eq!(bucket.income, 0.0, "bucket {} should be zero", bucket.label);
            assert_eq!(bucket.expense, 0.0, "bucket {} should be zero", bucket.label);
        }
    }

    #[test]
    fn aggregation_conserves_in_range_amounts() {
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));
        let transactions = vec![
            transaction(100.0, date!(2024 - 03 - 18), TransactionKind::Income),
            transaction(250.5, date!(2024 - 03 - 18), TransactionKind::Income),
            transaction(75.25, date!(2024 - 03 - 21), TransactionKind::Income),
            transaction(40.0, date!(2024 - 03 - 19), TransactionKind::Expense),
            transaction(19.99, date!(2024 - 03 - 24), TransactionKind::Expense),
        ];

        let filtered = filter_by_range(&transactions, range);
        let buckets = aggregate(&filtered, generate_buckets(Period::Week, range));

        let bucket_income: f64 = buckets.iter().map(|bucket| bucket.income).sum();
        let bucket_expense: f64 = buckets.iter().map(|bucket| bucket.expense).sum();
        assert_eq!(bucket_income, 100.0 + 250.5 + 75.25);
        assert_eq!(bucket_expense, 40.0 + 19.99);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));
        let transactions = vec![
            transaction(4000.0, date!(2024 - 03 - 18), TransactionKind::Income),
            transaction(2400.0, date!(2024 - 03 - 19), TransactionKind::Expense),
        ];

        let first = aggregate(&transactions, generate_buckets(Period::Week, range));
        let second = aggregate(&transactions, generate_buckets(Period::Week, range));
        // Feeding already-aggregated buckets back in must not double-count.
        let third = aggregate(&transactions, first.clone());

        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn filter_includes_range_boundaries() {
        let range = DateRange {
            start: date!(2024 - 03 - 18),
            end: date!(2024 - 03 - 24),
        };
        let transactions = vec![
            transaction(1.0, date!(2024 - 03 - 18), TransactionKind::Income),
            transaction(2.0, date!(2024 - 03 - 24), TransactionKind::Expense),
        ];

        let filtered = filter_by_range(&transactions, range);

        assert_eq!(filtered.len(), 2, "boundary dates should be included");
    }

    #[test]
    fn filter_preserves_order_and_input() {
        let range = DateRange {
            start: date!(2024 - 03 - 18),
            end: date!(2024 - 03 - 24),
        };
        let transactions = vec![
            transaction(3.0, date!(2024 - 03 - 22), TransactionKind::Income),
            transaction(1.0, date!(2024 - 03 - 10), TransactionKind::Income),
            transaction(2.0, date!(2024 - 03 - 19), TransactionKind::Expense),
        ];

        let filtered = filter_by_range(&transactions, range);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].amount, 3.0);
        assert_eq!(filtered[1].amount, 2.0);
        assert_eq!(transactions.len(), 3, "input list should be untouched");
    }

    #[test]
    fn week_of_income_and_expense_lands_in_the_right_buckets() {
        // Salary of 4000 on Monday, groceries of 2400 on Tuesday.
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));
        let transactions = vec![
            transaction(4000.0, date!(2024 - 03 - 18), TransactionKind::Income),
            transaction(2400.0, date!(2024 - 03 - 19), TransactionKind::Expense),
        ];

        let filtered = filter_by_range(&transactions, range);
        let buckets = aggregate(&filtered, generate_buckets(Period::Week, range));

        assert_eq!(buckets.len(), 7);
        assert_eq!((buckets[0].income, buckets[0].expense), (4000.0, 0.0));
        assert_eq!((buckets[1].income, buckets[1].expense), (0.0, 2400.0));
        for bucket in &buckets[2..] {
            assert_eq!((bucket.income, bucket.expense), (0.0, 0.0));
        }
    }

    #[test]
    fn transaction_before_the_range_is_excluded() {
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));
        let transactions = vec![transaction(
            500.0,
            range.start - Duration::days(1),
            TransactionKind::Income,
        )];

        let filtered = filter_by_range(&transactions, range);
        let buckets = aggregate(&filtered, generate_buckets(Period::Week, range));

        assert!(filtered.is_empty());
        for bucket in &buckets {
            assert_eq!((bucket.income, bucket.expense), (0.0, 0.0));
        }
    }

    #[test]
    fn unmatched_transaction_is_dropped_without_error() {
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));
        let out_of_range = vec![transaction(
            500.0,
            date!(2024 - 01 - 01),
            TransactionKind::Income,
        )];

        // Skip the filter to exercise the aggregator's own unmatched path.
        let buckets = aggregate(&out_of_range, generate_buckets(Period::Week, range));

        let total: f64 = buckets
            .iter()
            .map(|bucket| bucket.income + bucket.expense)
            .sum();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn chart_series_is_a_columnar_transposition() {
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));
        let transactions = vec![
            transaction(4000.0, date!(2024 - 03 - 18), TransactionKind::Income),
            transaction(2400.0, date!(2024 - 03 - 19), TransactionKind::Expense),
        ];
        let buckets = aggregate(&transactions, generate_buckets(Period::Week, range));

        let series = to_chart_series(&buckets);

        assert_eq!(series.labels.len(), 7);
        assert_eq!(series.income.len(), 7);
        assert_eq!(series.expense.len(), 7);
        assert_eq!(series.labels[0], "Mon 18");
        assert_eq!(series.income[0], 4000.0);
        assert_eq!(series.expense[1], 2400.0);
        assert_eq!(series.income[2..], [0.0; 5]);
    }

    #[test]
    fn summary_totals_cover_the_full_list() {
        let transactions = vec![
            transaction(4000.0, date!(2024 - 03 - 18), TransactionKind::Income),
            transaction(2400.0, date!(2024 - 03 - 19), TransactionKind::Expense),
            // Outside any reporting period, still counted in the totals.
            transaction(100.0, date!(2023 - 01 - 01), TransactionKind::Income),
        ];

        let summary = compute_summary(&transactions);

        assert_eq!(summary.total_income, 4100.0);
        assert_eq!(summary.total_expenses, 2400.0);
        assert_eq!(summary.balance, 1700.0);
    }

    #[test]
    fn summary_of_no_transactions_is_zero() {
        let summary = compute_summary(&[]);

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.balance, 0.0);
    }
}
