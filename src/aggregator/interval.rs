use std::time::Duration;

use crate::app::{GatorError, Result};

/// Parse an interval like "500ms", "10s", "5m" or "1h".
///
/// Only an unsigned integer followed by one of those four units is accepted.
/// Zero is rejected since it cannot drive a timer.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let invalid = || GatorError::InvalidDuration(s.to_string());

    let (digits, unit_ms) = if let Some(v) = s.strip_suffix("ms") {
        (v, 1)
    } else if let Some(v) = s.strip_suffix('s') {
        (v, 1_000)
    } else if let Some(v) = s.strip_suffix('m') {
        (v, 60_000)
    } else if let Some(v) = s.strip_suffix('h') {
        (v, 3_600_000)
    } else {
        return Err(invalid());
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let millis = digits
        .parse::<u64>()
        .ok()
        .and_then(|v| v.checked_mul(unit_ms))
        .ok_or_else(invalid)?;

    if millis == 0 {
        return Err(invalid());
    }

    Ok(Duration::from_millis(millis))
}

/// Format an interval using the largest unit that divides it exactly.
pub fn format_interval(interval: Duration) -> String {
    let millis = interval.as_millis();

    if millis >= 3_600_000 && millis % 3_600_000 == 0 {
        format!("{}h", millis / 3_600_000)
    } else if millis >= 60_000 && millis % 60_000 == 0 {
        format!("{}m", millis / 60_000)
    } else if millis >= 1_000 && millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{}ms", millis)
    }
}
