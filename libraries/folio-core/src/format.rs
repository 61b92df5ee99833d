//! Time readouts for the transport bar

use std::time::Duration;

/// Format seconds as `m:ss`
///
/// Non-finite or negative input (duration not yet known) renders as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Format a duration as `m:ss`
pub fn format_duration(duration: Duration) -> String {
    format_clock(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(5.9), "0:05");
        assert_eq!(format_clock(65.0), "1:05");
        assert_eq!(format_clock(600.4), "10:00");
    }

    #[test]
    fn unknown_duration_renders_zero() {
        assert_eq!(format_clock(f64::NAN), "0:00");
        assert_eq!(format_clock(f64::INFINITY), "0:00");
        assert_eq!(format_clock(-3.0), "0:00");
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(Duration::from_millis(201_500)), "3:21");
    }
}
