use std::sync::RwLock;

use chrono::{DateTime, Utc};

/// Monotonic-enough wall clock, abstracted so delay/scheduler tests can
/// control time instead of sleeping in real time.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Test double: holds a fixed instant until explicitly advanced.
pub struct FrozenClock {
  now: RwLock<DateTime<Utc>>,
}

impl FrozenClock {
  pub fn at(now: DateTime<Utc>) -> Self {
    Self { now: RwLock::new(now) }
  }

  pub fn advance(&self, delta: chrono::Duration) {
    let mut now = self.now.write().unwrap();
    *now += delta;
  }
}

impl Clock for FrozenClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.read().unwrap()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frozen_clock_only_moves_on_explicit_advance() {
    let start = Utc::now();
    let clock = FrozenClock::at(start);
    assert_eq!(clock.now(), start);
    clock.advance(chrono::Duration::seconds(30));
    assert_eq!(clock.now(), start + chrono::Duration::seconds(30));
  }
}
