//! Due-date classification.
//!
//! A due date is free text: either a calendar date (or date-time) or one of
//! the tokens `today`, `tomorrow`, or anything mentioning `week`. Every
//! predicate here accepts both forms and treats text that cannot be parsed as
//! "no match". Nothing in this module can fail.

use crate::domain::Task;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// A due date that parsed into something on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDue {
    /// Whole-day due date
    Day(NaiveDate),
    /// Due at a specific moment
    At(NaiveDateTime),
}

impl ParsedDue {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Day(d) => *d,
            Self::At(t) => t.date(),
        }
    }

    /// Point in time used for ordering (whole days start at midnight)
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::Day(d) => d.and_time(chrono::NaiveTime::MIN),
            Self::At(t) => *t,
        }
    }
}

/// Parse a due-date string. Sentinel tokens and anything unrecognised yield `None`.
pub fn parse_due(raw: &str) -> Option<ParsedDue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedDue::At(t.with_timezone(&Local).naive_local()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ParsedDue::At(t));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(ParsedDue::Day(d));
        }
    }
    None
}

/// True for the free-text tokens that stand in for a date
pub fn is_sentinel(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    lower == "today" || lower == "tomorrow" || lower.contains("week")
}

/// Last day of the current week: today plus `7 - weekday` days, with Sunday
/// as weekday 0. On a Sunday this is the following Sunday.
pub fn end_of_week(now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    let weekday = i64::from(today.weekday().num_days_from_sunday());
    today + Duration::days(7 - weekday)
}

/// Due on `now`'s calendar day, or the literal token "today" in any case
pub fn is_today(due: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(raw) = due else { return false };
    if raw.eq_ignore_ascii_case("today") {
        return true;
    }
    parse_due(raw).is_some_and(|p| p.date() == now.date())
}

/// Due on the day after `now`, or the literal token "tomorrow".
///
/// Tokens match the whole string; surrounding whitespace makes it plain text.
pub fn is_tomorrow(due: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(raw) = due else { return false };
    if raw.eq_ignore_ascii_case("tomorrow") {
        return true;
    }
    parse_due(raw).is_some_and(|p| p.date() == now.date() + Duration::days(1))
}

/// Due after today and no later than [`end_of_week`], or any text mentioning "week"
pub fn is_this_week(due: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(raw) = due else { return false };
    if raw.to_lowercase().contains("week") {
        return true;
    }
    parse_due(raw).is_some_and(|p| {
        let date = p.date();
        date > now.date() && date <= end_of_week(now)
    })
}

/// No sentinel form exists for yesterday
pub fn is_yesterday(due: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(raw) = due else { return false };
    parse_due(raw).is_some_and(|p| p.date() == now.date() - Duration::days(1))
}

/// Past due and not done: the parsed date is strictly before `now`. A
/// whole-day date stands for its midnight, so it is overdue from the start of
/// that day. Sentinel dates are never overdue.
pub fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    if task.completed {
        return false;
    }
    let Some(raw) = task.due_date.as_deref() else { return false };
    if is_sentinel(raw) {
        return false;
    }
    parse_due(raw).is_some_and(|p| p.timestamp() < now)
}

/// Undated, or due after the end of the current week. Sentinels and
/// unparseable text never count as later.
pub fn is_later(due: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(raw) = due else { return true };
    if is_sentinel(raw) {
        return false;
    }
    parse_due(raw).is_some_and(|p| p.date() > end_of_week(now))
}

/// Resolve a due date to a point in time for ordering. Sentinels map to the
/// start of the day they name ("week" maps to the end of the week).
pub fn due_timestamp(raw: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let lower = raw.to_lowercase();
    let midnight = chrono::NaiveTime::MIN;
    if lower == "today" {
        return Some(now.date().and_time(midnight));
    }
    if lower == "tomorrow" {
        return Some((now.date() + Duration::days(1)).and_time(midnight));
    }
    if lower.contains("week") {
        return Some(end_of_week(now).and_time(midnight));
    }
    parse_due(raw).map(|p| p.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Task, TaskRecord};

    /// Saturday, 1 June 2024, mid-morning
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn task_due(due: Option<&str>, completed: bool) -> Task {
        Task::from_record(TaskRecord {
            due_date: due.map(str::to_string),
            completed: Some(completed),
            ..TaskRecord::default()
        })
    }

    #[test]
    fn test_parse_due_formats() {
        let june3 = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(parse_due("2024-06-03"), Some(ParsedDue::Day(june3)));
        assert_eq!(parse_due("2024/06/03"), Some(ParsedDue::Day(june3)));
        assert_eq!(parse_due("06/03/2024"), Some(ParsedDue::Day(june3)));
        assert_eq!(
            parse_due("2024-06-03T09:15"),
            Some(ParsedDue::At(june3.and_hms_opt(9, 15, 0).unwrap()))
        );
        assert_eq!(parse_due("Today"), None);
        assert_eq!(parse_due("someday maybe"), None);
        assert_eq!(parse_due(""), None);
    }

    #[test]
    fn test_end_of_week() {
        // Saturday -> Sunday
        assert_eq!(end_of_week(now()), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());

        // Sunday -> next Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap().and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(end_of_week(sunday), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());

        // Wednesday -> Sunday
        let wednesday = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap().and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(end_of_week(wednesday), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
    }

    #[test]
    fn test_is_today() {
        assert!(is_today(Some("today"), now()));
        assert!(is_today(Some("Today"), now()));
        assert!(is_today(Some("2024-06-01"), now()));
        assert!(is_today(Some("2024-06-01T23:00"), now()));
        assert!(!is_today(Some("2024-06-02"), now()));
        assert!(!is_today(Some("not a date"), now()));
        assert!(!is_today(None, now()));
    }

    #[test]
    fn test_today_sentinel_ignores_clock() {
        let far_future = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(is_today(Some("TODAY"), far_future));
    }

    #[test]
    fn test_is_tomorrow() {
        assert!(is_tomorrow(Some("tomorrow"), now()));
        assert!(is_tomorrow(Some("2024-06-02"), now()));
        assert!(!is_tomorrow(Some("2024-06-01"), now()));
        assert!(!is_tomorrow(Some("today"), now()));
        assert!(!is_tomorrow(None, now()));
    }

    #[test]
    fn test_sentinel_tokens_match_exactly() {
        assert!(!is_today(Some(" today "), now()));
        assert!(!is_tomorrow(Some("tomorrow\n"), now()));
        assert!(!is_sentinel(" today"));
        assert_eq!(due_timestamp(" tomorrow ", now()), None);
        // Padded calendar dates still parse
        assert!(is_today(Some(" 2024-06-01 "), now()));
    }

    #[test]
    fn test_is_this_week() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();
        assert!(is_this_week(Some("This Week"), wednesday));
        assert!(is_this_week(Some("next week"), wednesday));
        assert!(is_this_week(Some("2024-06-06"), wednesday));
        assert!(is_this_week(Some("2024-06-09"), wednesday));
        assert!(!is_this_week(Some("2024-06-05"), wednesday));
        assert!(!is_this_week(Some("2024-06-10"), wednesday));
        assert!(!is_this_week(Some("garbage"), wednesday));
        assert!(!is_this_week(None, wednesday));
    }

    #[test]
    fn test_is_yesterday() {
        assert!(is_yesterday(Some("2024-05-31"), now()));
        assert!(!is_yesterday(Some("yesterday"), now()));
        assert!(!is_yesterday(Some("2024-06-01"), now()));
    }

    #[test]
    fn test_is_overdue() {
        assert!(is_overdue(&task_due(Some("2020-01-01"), false), now()));
        assert!(!is_overdue(&task_due(Some("2020-01-01"), true), now()));
        assert!(!is_overdue(&task_due(None, false), now()));
        assert!(!is_overdue(&task_due(Some("today"), false), now()));
        assert!(!is_overdue(&task_due(Some("Tomorrow"), false), now()));
        assert!(!is_overdue(&task_due(Some("end of week"), false), now()));
        assert!(!is_overdue(&task_due(Some("whenever"), false), now()));
        // A whole-day date counts from its midnight
        assert!(is_overdue(&task_due(Some("2024-06-01"), false), now()));
        assert!(!is_overdue(&task_due(Some("2024-06-02"), false), now()));
        let midnight = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(!is_overdue(&task_due(Some("2024-06-01"), false), midnight));
        assert!(is_overdue(&task_due(Some("2024-06-01T09:00"), false), now()));
        assert!(!is_overdue(&task_due(Some("2024-06-01T11:00"), false), now()));
    }

    #[test]
    fn test_is_later() {
        assert!(is_later(None, now()));
        assert!(is_later(Some("2024-06-03"), now()));
        assert!(!is_later(Some("2024-06-02"), now()));
        assert!(!is_later(Some("today"), now()));
        assert!(!is_later(Some("week"), now()));
        assert!(!is_later(Some("garbage"), now()));
    }

    #[test]
    fn test_due_timestamp_resolves_sentinels() {
        let midnight = |d: u32| NaiveDate::from_ymd_opt(2024, 6, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(due_timestamp("today", now()), Some(midnight(1)));
        assert_eq!(due_timestamp("Tomorrow", now()), Some(midnight(2)));
        assert_eq!(due_timestamp("this week", now()), Some(midnight(2)));
        assert_eq!(due_timestamp("2024-06-20", now()), Some(midnight(20)));
        assert_eq!(due_timestamp("soon", now()), None);
    }
}
