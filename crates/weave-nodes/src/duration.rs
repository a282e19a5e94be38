use std::time::Duration;

/// Parses `5s` / `2m` / `1h` style durations (§4.2.3). Returns `None` for
/// anything that doesn't match `<number><unit>` with unit in `s|m|h`.
pub fn parse_duration_string(s: &str) -> Option<Duration> {
  let s = s.trim();
  let (number, unit) = s.split_at(s.len().checked_sub(1)?);
  let value: f64 = number.parse().ok()?;
  let seconds = match unit {
    "s" => value,
    "m" => value * 60.0,
    "h" => value * 3600.0,
    _ => return None,
  };
  if seconds < 0.0 {
    return None;
  }
  Some(Duration::from_secs_f64(seconds))
}

/// DELAY's config recognizes `duration`, `duration_ms`, `duration_seconds`
/// in that priority order, first non-zero wins.
pub fn resolve_delay_duration(resolver: &weave_resolver::FieldResolver) -> Duration {
  if let Some(s) = resolver.resolve("duration").and_then(|v| v.as_str().map(str::to_string)) {
    if let Some(d) = parse_duration_string(&s) {
      if !d.is_zero() {
        return d;
      }
    }
  }
  let ms = resolver.get_int("duration_ms", 0);
  if ms > 0 {
    return Duration::from_millis(ms as u64);
  }
  let secs = resolver.get_float("duration_seconds", 0.0);
  if secs > 0.0 {
    return Duration::from_secs_f64(secs);
  }
  Duration::ZERO
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_seconds_minutes_hours() {
    assert_eq!(parse_duration_string("5s"), Some(Duration::from_secs(5)));
    assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
    assert_eq!(parse_duration_string("1h"), Some(Duration::from_secs(3600)));
  }

  #[test]
  fn rejects_unknown_unit() {
    assert_eq!(parse_duration_string("5x"), None);
  }
}
