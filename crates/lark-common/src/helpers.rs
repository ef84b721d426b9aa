//! Common helper functions for LarkXR.

use std::time::Duration;

/// Wall-clock time in microseconds since the Unix epoch.
pub fn now_us() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

/// Period of one tick at `rate_hz`; a zero rate is treated as 1 Hz.
pub fn tick_interval(rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / rate_hz.max(1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval() {
        assert_eq!(tick_interval(0), Duration::from_secs(1));
        let sixty = tick_interval(60);
        assert!(sixty > Duration::from_millis(16) && sixty < Duration::from_millis(17));
    }

    #[test]
    fn test_now_us_monotonic_enough() {
        let a = now_us();
        let b = now_us();
        assert!(b >= a);
    }
}
