//! Spoken duration estimates.

/// Average speaking rate used for estimates.
pub const CHARS_PER_SECOND: f64 = 15.0;

/// Format seconds as `m:ss`.
///
/// Fractions of a second are dropped. Expects a finite, non-negative value.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// Estimated reading time in seconds for `char_count` characters.
pub fn estimate_seconds(char_count: usize) -> f64 {
    char_count as f64 / CHARS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(65.0), "1:05");
        assert_eq!(format_duration(5.0), "0:05");
        assert_eq!(format_duration(0.0), "0:00");
    }

    #[test]
    fn test_format_duration_drops_fractions() {
        assert_eq!(format_duration(59.99), "0:59");
        assert_eq!(format_duration(120.5), "2:00");
    }

    #[test]
    fn test_format_duration_long() {
        assert_eq!(format_duration(3725.0), "62:05");
    }

    #[test]
    fn test_estimate_seconds() {
        assert_eq!(estimate_seconds(0), 0.0);
        assert_eq!(estimate_seconds(150), 10.0);
        assert_eq!(format_duration(estimate_seconds(1000)), "1:06");
    }
}
