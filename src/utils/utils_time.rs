use chrono::Utc;
use std::time::Duration;

pub fn current_time_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// `1.234s`, `850ms`: short enough for a single log line.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed.as_secs() > 0 {
        format!("{:.3}s", elapsed.as_secs_f64())
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(850)), "850ms");
        assert_eq!(format_elapsed(Duration::from_millis(1234)), "1.234s");
    }

    #[test]
    fn test_current_time_is_after_2020() {
        assert!(current_time_ms() > 1_577_836_800_000);
    }
}
