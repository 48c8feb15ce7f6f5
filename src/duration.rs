//! Human-readable duration parsing for CLI options.

use std::time::Duration;

/// Suffixes tried in order; `ms` must precede `m` and `s`.
const SUFFIXES: [(&str, u64); 4] = [("ms", 1), ("h", 3_600_000), ("m", 60_000), ("s", 1_000)];

/// Parse a duration from a human-readable string.
///
/// Accepts a number with an `ms`, `s`, `m`, or `h` suffix; a bare number is
/// interpreted as seconds.
///
/// # Examples
/// ```
/// use presence_log::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("15s").unwrap(), Duration::from_secs(15));
/// assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("15").unwrap(), Duration::from_secs(15));
/// ```
pub fn parse_duration(src: &str) -> Result<Duration, String> {
    let src = src.trim();
    if src.is_empty() {
        return Err("empty duration string".to_string());
    }

    for (suffix, millis_per_unit) in SUFFIXES {
        if let Some(number) = src.strip_suffix(suffix) {
            let units: u64 = number
                .trim()
                .parse()
                .map_err(|_| format!("invalid duration: {src}"))?;
            return Ok(Duration::from_millis(units * millis_per_unit));
        }
    }

    let secs: u64 = src
        .parse()
        .map_err(|_| format!("invalid duration: {src}"))?;
    Ok(Duration::from_secs(secs))
}
