//! Timestamps are stored as RFC 3339 strings with whole-second precision and
//! an explicit UTC offset, e.g. `2024-05-01T12:30:00Z`.

use std::{fmt, sync::LazyLock};

use chrono::{DateTime, FixedOffset, SecondsFormat, SubsecRound, TimeZone, Utc};
use regex::Regex;

/// The exact shape accepted by [`parse`]: uppercase `T` between date and time,
/// and either `Z` or a numeric offset.
static RFC3339: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
        .expect("RFC 3339 pattern is valid")
});

/// Error returned when a stored timestamp is not valid RFC 3339.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid timestamp format (expected RFC3339): {input:?}: {reason}")]
pub struct InvalidFormatError {
    input: String,
    reason: String,
}

/// Encodes an instant as RFC 3339, truncated to whole seconds.
///
/// UTC instants use the `Z` suffix; other offsets are written explicitly.
pub fn format<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Decodes an RFC 3339 timestamp.
///
/// Fractional seconds are accepted but the offset is mandatory. The date and
/// time must be joined by an uppercase `T` and UTC must be written `Z`; the
/// space and lowercase forms RFC 3339 tolerates are rejected.
///
/// # Errors
///
/// Returns an [`InvalidFormatError`] if the input is not a complete RFC 3339
/// date-time.
pub fn parse(input: &str) -> Result<DateTime<FixedOffset>, InvalidFormatError> {
    let invalid = |reason: String| InvalidFormatError {
        input: input.to_string(),
        reason,
    };

    if !RFC3339.is_match(input) {
        return Err(invalid(
            "expected YYYY-MM-DDTHH:MM:SS with a Z or +HH:MM offset".to_string(),
        ));
    }

    DateTime::parse_from_rfc3339(input).map_err(|e| invalid(e.to_string()))
}

/// The current time at the precision the store persists.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
