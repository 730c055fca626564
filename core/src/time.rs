//! Time related utils.

use crate::Error;
use chrono::{NaiveDate, NaiveDateTime, Utc};

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format time into RFC3339 with a second precision: `2022-03-13T07:20:04Z`
pub fn format_rfc3339(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO 8601 UTC timestamp in any of the forms accepted for
/// shared access signatures:
///
/// - `2022-03-13T07:20:04Z`
/// - `2022-03-13T07:20:04.1234567Z`
/// - `2022-03-13T07:20Z`
/// - `2022-03-13`
///
/// Only the `Z` designator is accepted. Offsets such as `+00:00` are
/// rejected because a raw `+` in a query string decodes to a space.
pub fn parse_iso8601(s: &str) -> crate::Result<DateTime> {
    for fmt in ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%MZ"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t.and_utc());
        }
    }

    let date = parse_date(s)?;
    date.and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .ok_or_else(|| Error::unexpected(format!("failed to parse iso8601 time: {s}")))
}

/// Parse a calendar date in the `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| Error::unexpected(format!("failed to parse date: {s}")).with_source(e))
}
