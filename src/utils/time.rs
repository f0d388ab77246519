use chrono::DateTime;
use chrono::Local;
use chrono::TimeZone;

/// Wall clock reading used to stamp events
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// `YYYY-MM-DD HH:MM:SS[.fraction]` with up to nine fractional digits.
///
/// Trailing zero digits are dropped, and the dot with them when the
/// fraction is zero.
pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let base = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    // Leap seconds are reported as nanos >= 1_000_000_000
    let nanos = ts.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos == 0 {
        return base;
    }
    let fraction = format!("{nanos:09}");
    format!("{}.{}", base, fraction.trim_end_matches('0'))
}
