//! Dashboard period counts over registration records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Registrations counted within one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCounts {
    pub tagged: usize,
    pub owners: usize,
    pub keepers: usize,
    /// No remote source reports exits yet; always zero.
    #[serde(default)]
    pub exited: usize,
}

/// Counts for today, the last seven days, and the last month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today: PeriodCounts,
    pub week: PeriodCounts,
    pub month: PeriodCounts,
    /// RFC 3339 time the counts were computed.
    pub last_updated: String,
    /// Set when served from cache because the live fetch failed.
    #[serde(default)]
    pub stale: bool,
}

impl DashboardSummary {
    /// Count `created_at` timestamps of each source relative to `now`.
    pub fn summarize(owners: &[Value], keepers: &[Value], tagged: &[Value], now: OffsetDateTime) -> Self {
        let starts = PeriodStarts::new(now);
        let count = |items: &[Value], since: OffsetDateTime| {
            items
                .iter()
                .filter_map(|r| r.get("created_at").and_then(Value::as_str))
                .filter_map(parse_timestamp)
                .filter(|t| *t >= since)
                .count()
        };
        let period = |since| PeriodCounts {
            tagged: count(tagged, since),
            owners: count(owners, since),
            keepers: count(keepers, since),
            exited: 0,
        };
        Self {
            today: period(starts.today),
            week: period(starts.week),
            month: period(starts.month),
            last_updated: now.format(&Rfc3339).unwrap_or_default(),
            stale: false,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

struct PeriodStarts {
    today: OffsetDateTime,
    week: OffsetDateTime,
    month: OffsetDateTime,
}

impl PeriodStarts {
    fn new(now: OffsetDateTime) -> Self {
        let today = now.replace_time(Time::MIDNIGHT);
        let week = now - Duration::days(7);
        let month = month_ago(now.date())
            .map(|d| now.replace_date(d))
            .unwrap_or(now - Duration::days(30));
        Self { today, week, month }
    }
}

/// Same day of the previous month, clamped to that month's last day.
fn month_ago(date: Date) -> Option<Date> {
    let (year, month) = match date.month() {
        Month::January => (date.year() - 1, Month::December),
        m => (date.year(), m.previous()),
    };
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).ok()
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC), and bare dates.
fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    if let Ok(t) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(t);
    }
    if let Ok(t) = PrimitiveDateTime::parse(text, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")) {
        return Some(t.assume_utc());
    }
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}
