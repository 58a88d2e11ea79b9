//! Display formatting for distance, pace, and duration.

/// Format a distance for display.
///
/// Below 1000 m renders whole meters (`"743 m"`); at or above 1000 m renders
/// kilometers with 2 decimal places (`"5.28 km"`).
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Format an average pace as minutes and seconds per kilometer.
///
/// Returns the `"0:00 /km"` sentinel when no distance has been covered, so
/// callers never divide by zero. A seconds remainder that rounds to 60 is
/// carried into the minute component (59.6 s renders as the next minute,
/// never `"X:60"`).
pub fn format_pace(seconds: f64, meters: f64) -> String {
    if meters == 0.0 {
        return "0:00 /km".to_string();
    }

    let secs_per_km = seconds / (meters / 1000.0);
    let mut minutes = (secs_per_km / 60.0).floor() as i64;
    let mut remainder = (secs_per_km - minutes as f64 * 60.0).round() as i64;
    if remainder == 60 {
        minutes += 1;
        remainder = 0;
    }

    format!("{}:{:02} /km", minutes, remainder)
}

/// Format an elapsed duration as `H:MM:SS`, or `M:SS` below one hour.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_below_km() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(743.2), "743 m");
        assert_eq!(format_distance(999.4), "999 m");
    }

    #[test]
    fn test_distance_km_boundary() {
        assert_eq!(format_distance(1000.0), "1.00 km");
        assert_eq!(format_distance(5280.0), "5.28 km");
    }

    #[test]
    fn test_pace_zero_distance_sentinel() {
        assert_eq!(format_pace(0.0, 0.0), "0:00 /km");
        assert_eq!(format_pace(300.0, 0.0), "0:00 /km");
    }

    #[test]
    fn test_pace_exact() {
        // 300 seconds over 1 km = 5:00 /km
        assert_eq!(format_pace(300.0, 1000.0), "5:00 /km");
    }

    #[test]
    fn test_pace_rounds_seconds() {
        // 312.4 s/km rounds to 5:12
        assert_eq!(format_pace(312.4, 1000.0), "5:12 /km");
    }

    #[test]
    fn test_pace_carries_rounded_minute() {
        // 359.6 s/km: remainder rounds to 60 and must carry, not render "5:60"
        assert_eq!(format_pace(359.6, 1000.0), "6:00 /km");
    }

    #[test]
    fn test_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(1872), "31:12");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }
}
