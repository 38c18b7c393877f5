//! Human-readable renderings of gaps used in progress messages.

/// `"420.0 meters"`, `"3.2 kilometers"`, or `"unknown"` when either side
/// had no landing position.
pub fn distance_display(meters: Option<f64>) -> String {
    match meters {
        None => "unknown".to_string(),
        Some(m) if m < 1000.0 => format!("{:.1} meters", m),
        Some(m) => format!("{:.1} kilometers", m / 1000.0),
    }
}

/// Pick the largest unit that keeps the number readable.
pub fn time_display(hours: f64) -> String {
    if hours < 1.0 / 60.0 {
        format!("{:.0} seconds", hours * 3600.0)
    } else if hours < 1.0 {
        format!("{:.0} minutes", hours * 60.0)
    } else if hours < 24.0 {
        format!("{:.1} hours", hours)
    } else {
        format!("{:.1} days", hours / 24.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_display() {
        assert_eq!(distance_display(Some(420.0)), "420.0 meters");
        assert_eq!(distance_display(Some(3300.0)), "3.3 kilometers");
        assert_eq!(distance_display(None), "unknown");
    }

    #[test]
    fn test_time_display() {
        assert_eq!(time_display(10.0 / 3600.0), "10 seconds");
        assert_eq!(time_display(0.5), "30 minutes");
        assert_eq!(time_display(2.5), "2.5 hours");
        assert_eq!(time_display(36.0), "1.5 days");
    }
}
