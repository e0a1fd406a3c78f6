use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use datalens_core::constants::TS_FORMAT;
use regex::Regex;

/// A resolved time window: a SQL predicate over the `ts` column plus a
/// human-readable label. Always used as a conjunct, never as a replacement
/// for other filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFilter {
    pub predicate: String,
    pub label: String,
}

impl TimeFilter {
    /// The tautological filter: no time bound at all.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { predicate: "1=1".to_owned(), label: "all time".to_owned() }
    }

    /// Whether this filter actually constrains the window.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.predicate != "1=1"
    }

    fn since(cutoff: chrono::NaiveDateTime, label: impl Into<String>) -> Self {
        Self {
            predicate: format!("ts >= '{}'", cutoff.format(TS_FORMAT)),
            label: label.into(),
        }
    }
}

static RELATIVE_WINDOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:past|last)\s+(\d+)\s+(second|minute|hour|day|week|month)s?\b")
        .expect("relative window regex is valid")
});

/// Resolve a time phrase in `message` into a filter, evaluated against `now`.
///
/// Scan order: "past|last N unit" (first numeric match wins, no attempt to
/// reconcile several), then the bare "past week" / "past month" phrases,
/// then "today", then "this week" / "this month". Months are approximated
/// as 30 days. Anything else resolves to the unbounded filter.
#[must_use]
pub fn resolve_time_window(message: &str, now: DateTime<Utc>) -> TimeFilter {
    let m = message.to_lowercase();
    let local = now.naive_utc();

    if let Some(caps) = RELATIVE_WINDOW.captures(&m) {
        if let Some(filter) = resolve_relative(&caps, local) {
            return filter;
        }
    }

    if m.contains("past week") {
        return TimeFilter::since(local - Duration::days(7), "last 7 days");
    }
    if m.contains("past month") {
        return TimeFilter::since(local - Duration::days(30), "last 30 days");
    }

    if m.contains("today") {
        return TimeFilter::since(local.date().and_time(NaiveTime::MIN), "today");
    }

    if m.contains("this week") {
        let week_start = local.date() - Duration::days(i64::from(local.weekday().num_days_from_monday()));
        return TimeFilter::since(week_start.and_time(NaiveTime::MIN), "this week");
    }
    if m.contains("this month") {
        let month_start = local.date().with_day(1).unwrap_or(local.date());
        return TimeFilter::since(month_start.and_time(NaiveTime::MIN), "this month");
    }

    TimeFilter::unbounded()
}

fn resolve_relative(caps: &regex::Captures<'_>, local: chrono::NaiveDateTime) -> Option<TimeFilter> {
    let n: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();
    let span = match unit {
        "second" => Duration::try_seconds(n)?,
        "minute" => Duration::try_minutes(n)?,
        "hour" => Duration::try_hours(n)?,
        "day" => Duration::try_days(n)?,
        "week" => Duration::try_weeks(n)?,
        // months approximated as 30 days
        "month" => Duration::try_days(n.checked_mul(30)?)?,
        _ => return None,
    };
    let label =
        if n == 1 { format!("last {n} {unit}") } else { format!("last {n} {unit}s") };
    Some(TimeFilter::since(local.checked_sub_signed(span)?, label))
}
