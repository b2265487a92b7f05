//! Per-session visit counting.
//!
//! The session keeps two strings: `visits`, a decimal count, and
//! `last_visit`, a `YYYY-MM-DD HH:MM:SS.ffffff` timestamp. The count goes up
//! by one when at least a full day has elapsed since `last_visit`.

use chrono::NaiveDateTime;
use std::num::ParseIntError;
use thiserror::Error;

use super::SessionStore;

pub const VISITS_KEY: &str = "visits";
pub const LAST_VISIT_KEY: &str = "last_visit";

/// Format `last_visit` is written in.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
/// Format of the stored timestamp once the fractional suffix is dropped.
const TRUNCATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Length of the `.ffffff` suffix dropped before parsing.
const FRACTION_SUFFIX_LEN: usize = 7;

#[derive(Debug, Error)]
pub enum VisitError {
    #[error("invalid visit count {value:?}: {source}")]
    InvalidCount {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid last visit timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Typed view of the two session keys after tracking a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitState {
    pub visits: u64,
    pub last_visit: NaiveDateTime,
}

pub fn format_timestamp(time: NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Returns the stored value for `key`, or `default` when it is absent or empty.
pub fn get_session_value<S>(session: &S, key: &str, default: &str) -> String
where
    S: SessionStore + ?Sized,
{
    match session.get(key) {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Drops the fractional suffix and parses the remaining `YYYY-MM-DD HH:MM:SS`.
/// Values shorter than the suffix parse as an empty string and fail.
fn parse_last_visit(value: &str) -> Result<NaiveDateTime, VisitError> {
    let end = value
        .char_indices()
        .rev()
        .nth(FRACTION_SUFFIX_LEN - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    NaiveDateTime::parse_from_str(&value[..end], TRUNCATED_FORMAT).map_err(|source| VisitError::InvalidTimestamp {
        value: value.to_string(),
        source,
    })
}

/// Updates the visit counter of `session` for a request made at `now`.
///
/// Both keys are always written back. `last_visit` only moves forward when
/// the count is incremented.
pub fn visitor_cookie_handler<S>(session: &mut S, now: NaiveDateTime) -> Result<VisitState, VisitError>
where
    S: SessionStore + ?Sized,
{
    let raw_visits = get_session_value(session, VISITS_KEY, "1");
    let mut visits: u64 = raw_visits.trim().parse().map_err(|source| VisitError::InvalidCount {
        value: raw_visits.clone(),
        source,
    })?;

    let last_visit_cookie = get_session_value(session, LAST_VISIT_KEY, &format_timestamp(now));
    let last_visit_time = parse_last_visit(&last_visit_cookie)?;

    let last_visit = if (now - last_visit_time).num_days() > 0 {
        visits += 1;
        session.set(LAST_VISIT_KEY, format_timestamp(now));
        now
    } else {
        session.set(LAST_VISIT_KEY, last_visit_cookie);
        last_visit_time
    };

    session.set(VISITS_KEY, visits.to_string());

    Ok(VisitState { visits, last_visit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn empty_values_fall_back_to_default() {
        let session = MemorySession::with_values([("visits", "")]);
        assert_eq!(get_session_value(&session, "visits", "1"), "1");
        assert_eq!(get_session_value(&session, "missing", "x"), "x");

        let session = MemorySession::with_values([("visits", "7")]);
        assert_eq!(get_session_value(&session, "visits", "1"), "7");
    }

    #[test]
    fn first_visit_starts_at_one() {
        let now = at("2024-03-05 08:30:00");
        let mut session = MemorySession::new();

        let state = visitor_cookie_handler(&mut session, now).unwrap();

        assert_eq!(state.visits, 1);
        assert_eq!(session.get(VISITS_KEY).as_deref(), Some("1"));
        assert_eq!(session.get(LAST_VISIT_KEY).as_deref(), Some("2024-03-05 08:30:00.000000"));
    }

    #[test]
    fn same_day_keeps_count_and_timestamp() {
        let mut session = MemorySession::with_values([("visits", "3"), ("last_visit", "2024-01-01 10:00:00.000000")]);

        let state = visitor_cookie_handler(&mut session, at("2024-01-01 15:00:00")).unwrap();

        assert_eq!(state.visits, 3);
        assert_eq!(session.get(VISITS_KEY).as_deref(), Some("3"));
        assert_eq!(session.get(LAST_VISIT_KEY).as_deref(), Some("2024-01-01 10:00:00.000000"));
    }

    #[test]
    fn next_day_after_a_full_day_increments() {
        let mut session = MemorySession::with_values([("visits", "3"), ("last_visit", "2024-01-01 10:00:00.000000")]);

        let state = visitor_cookie_handler(&mut session, at("2024-01-02 11:00:00")).unwrap();

        assert_eq!(state.visits, 4);
        assert_eq!(state.last_visit, at("2024-01-02 11:00:00"));
        assert_eq!(session.get(VISITS_KEY).as_deref(), Some("4"));
        assert_eq!(session.get(LAST_VISIT_KEY).as_deref(), Some("2024-01-02 11:00:00.000000"));
    }

    #[test]
    fn crossing_midnight_without_a_full_day_does_not_increment() {
        let mut session = MemorySession::with_values([("visits", "2"), ("last_visit", "2024-01-01 23:00:00.123456")]);

        let state = visitor_cookie_handler(&mut session, at("2024-01-02 09:00:00")).unwrap();

        assert_eq!(state.visits, 2);
        assert_eq!(session.get(LAST_VISIT_KEY).as_deref(), Some("2024-01-01 23:00:00.123456"));
    }

    #[test]
    fn several_days_still_increment_by_one() {
        let mut session = MemorySession::with_values([("visits", "5"), ("last_visit", "2024-01-01 10:00:00.000000")]);

        let state = visitor_cookie_handler(&mut session, at("2024-01-09 10:00:00")).unwrap();

        assert_eq!(state.visits, 6);
    }

    #[test]
    fn clock_going_backwards_does_not_increment() {
        let mut session = MemorySession::with_values([("visits", "5"), ("last_visit", "2024-01-09 10:00:00.000000")]);

        let state = visitor_cookie_handler(&mut session, at("2024-01-01 10:00:00")).unwrap();

        assert_eq!(state.visits, 5);
    }

    #[test]
    fn malformed_timestamp_is_an_error() {
        let mut session = MemorySession::with_values([("last_visit", "2024-01-01 10:00:00")]);
        let err = visitor_cookie_handler(&mut session, at("2024-01-01 12:00:00")).unwrap_err();
        assert!(matches!(err, VisitError::InvalidTimestamp { .. }));

        let mut session = MemorySession::with_values([("last_visit", "short")]);
        assert!(visitor_cookie_handler(&mut session, at("2024-01-01 12:00:00")).is_err());
    }

    #[test]
    fn non_numeric_count_is_an_error() {
        let mut session = MemorySession::with_values([("visits", "many")]);
        let err = visitor_cookie_handler(&mut session, at("2024-01-01 12:00:00")).unwrap_err();
        assert!(matches!(err, VisitError::InvalidCount { .. }));
    }
}
