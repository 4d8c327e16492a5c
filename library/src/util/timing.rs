use std::borrow::Cow;
use std::time::{Duration, Instant};

use log::{self, Level};

/// Logs how long a scope took when dropped.
pub struct ScopedTimer {
    label: Cow<'static, str>,
    level: Level,
    start: Instant,
}

impl ScopedTimer {
    pub fn with_level(label: impl Into<Cow<'static, str>>, level: Level) -> Self {
        Self {
            label: label.into(),
            level,
            start: Instant::now(),
        }
    }

    pub fn info(label: impl Into<Cow<'static, str>>) -> Self {
        Self::with_level(label, Level::Info)
    }

    pub fn debug(label: impl Into<Cow<'static, str>>) -> Self {
        Self::with_level(label, Level::Debug)
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::log!(
            self.level,
            "{} took {}",
            self.label,
            format_elapsed(self.start.elapsed())
        );
    }
}

/// Runs `f` and returns its result with the wall-clock time it took.
pub fn timed<T, F>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// Formats a duration in milliseconds, microseconds or nanoseconds with two
/// decimals.
///
/// A unit is used once the duration spans at least two whole units of it,
/// so 1.5ms reads `1500.00μs` and 2ms reads `2.00ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    if nanos >= 2_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else if nanos >= 2_000 {
        format!("{:.2}μs", nanos as f64 / 1_000.0)
    } else {
        format!("{:.2}ns", nanos as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed_units() {
        assert_eq!(format_elapsed(Duration::from_millis(2)), "2.00ms");
        assert_eq!(format_elapsed(Duration::from_micros(1500)), "1500.00μs");
        assert_eq!(format_elapsed(Duration::from_micros(12_340)), "12.34ms");
        assert_eq!(format_elapsed(Duration::from_nanos(1500)), "1500.00ns");
        assert_eq!(format_elapsed(Duration::from_nanos(2500)), "2.50μs");
        assert_eq!(format_elapsed(Duration::ZERO), "0.00ns");
    }

    #[test]
    fn test_timed_returns_result() {
        let (value, elapsed) = timed(|| 21 * 2);
        assert_eq!(value, 42);
        assert!(elapsed < Duration::from_secs(5));
    }
}
