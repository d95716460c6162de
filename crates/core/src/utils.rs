use std::time::Duration;

/// Longest window we will ever schedule, about 31 years.
const MAX_WINDOW_SECS: f32 = 1e9;

/// Converts a configured number of seconds into a `Duration`. Negative and NaN
/// values become zero.
pub fn secs(seconds: f32) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f32(seconds.min(MAX_WINDOW_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secs_saturates() {
        assert_eq!(secs(-3.0), Duration::ZERO);
        assert_eq!(secs(f32::NAN), Duration::ZERO);
        assert_eq!(secs(2.5), Duration::from_millis(2500));
        assert_eq!(secs(f32::INFINITY), Duration::from_secs_f32(MAX_WINDOW_SECS));
    }
}
