//! Reporting period selection and date range resolution for the dashboard.

use serde::Deserialize;
use time::{Date, Duration};

/// The reporting granularity for the dashboard chart.
///
/// Controls both the resolved date range and the buckets on the chart's
/// x-axis. Defaults to [Period::Week] when the query string omits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The current calendar date.
    Day,
    /// Monday through Sunday of the current week.
    #[default]
    Week,
    /// The first through last calendar day of the current month.
    Month,
}

impl Period {
    /// The value used in the dashboard query string, e.g. '/dashboard?period=week'.
    pub(super) fn as_query_value(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// The text shown on the period selector button.
    pub(super) fn display_name(self) -> &'static str {
        match self {
            Period::Day => "Day",
            Period::Week => "Week",
            Period::Month => "Month",
        }
    }
}

/// An inclusive range of calendar dates.
///
/// Transaction dates have no time-of-day component, so comparing calendar
/// dates inclusively covers the full first and last days of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DateRange {
    /// The first date in the range.
    pub start: Date,
    /// The last date in the range.
    pub end: Date,
}

/// Resolve the date range that `period` covers relative to `today`.
///
/// The week range always starts on Monday.
pub(super) fn resolve_range(period: Period, today: Date) -> DateRange {
    match period {
        Period::Day => DateRange {
            start: today,
            end: today,
        },
        Period::Week => {
            let days_since_monday = today.weekday().number_days_from_monday();
            let start = today - Duration::days(days_since_monday as i64);

            DateRange {
                start,
                end: start + Duration::days(6),
            }
        }
        Period::Month => {
            let start = today - Duration::days(today.day() as i64 - 1);
            let month_length = today.month().length(today.year());

            DateRange {
                start,
                end: start + Duration::days(month_length as i64 - 1),
            }
        }
    }
}

#[cfg(test)]
mod resolve_range_tests {
    use time::macros::date;

    use super::{DateRange, Period, resolve_range};

    #[test]
    fn day_range_is_the_current_date() {
        let today = date!(2024 - 03 - 20);

        let range = resolve_range(Period::Day, today);

        assert_eq!(
            range,
            DateRange {
                start: today,
                end: today
            }
        );
    }

    #[test]
    fn week_range_runs_monday_through_sunday() {
        // 2024-03-20 is a Wednesday.
        let range = resolve_range(Period::Week, date!(2024 - 03 - 20));

        assert_eq!(
            range,
            DateRange {
                start: date!(2024 - 03 - 18),
                end: date!(2024 - 03 - 24)
            }
        );
    }

    #[test]
    fn week_range_on_monday_starts_today() {
        // 2024-03-18 is a Monday.
        let range = resolve_range(Period::Week, date!(2024 - 03 - 18));

        assert_eq!(range.start, date!(2024 - 03 - 18));
        assert_eq!(range.end, date!(2024 - 03 - 24));
    }

    #[test]
    fn week_range_on_sunday_ends_today() {
        // 2024-03-24 is a Sunday.
        let range = resolve_range(Period::Week, date!(2024 - 03 - 24));

        assert_eq!(range.start, date!(2024 - 03 - 18));
        assert_eq!(range.end, date!(2024 - 03 - 24));
    }

    #[test]
    fn month_range_covers_the_whole_month() {
        let range = resolve_range(Period::Month, date!(2024 - 03 - 20));

        assert_eq!(
            range,
            DateRange {
                start: date!(2024 - 03 - 01),
                end: date!(2024 - 03 - 31)
            }
        );
    }

    #[test]
    fn month_range_handles_leap_february() {
        let range = resolve_range(Period::Month, date!(2024 - 02 - 15));

        assert_eq!(range.start, date!(2024 - 02 - 01));
        assert_eq!(range.end, date!(2024 - 02 - 29));
    }

    #[test]
    fn month_range_handles_regular_february() {
        let range = resolve_range(Period::Month, date!(2023 - 02 - 15));

        assert_eq!(range.start, date!(2023 - 02 - 01));
        assert_eq!(range.end, date!(2023 - 02 - 28));
    }

    #[test]
    fn period_defaults_to_week_in_query_strings() {
        #[derive(serde::Deserialize)]
        struct Query {
            #[serde(default)]
            period: Period,
        }

        let query: Query = serde_html_form::from_str("").unwrap();
        assert_eq!(query.period, Period::Week);

        let query: Query = serde_html_form::from_str("period=month").unwrap();
        assert_eq!(query.period, Period::Month);

        let query: Query = serde_html_form::from_str("period=day").unwrap();
        assert_eq!(query.period, Period::Day);
    }
}
