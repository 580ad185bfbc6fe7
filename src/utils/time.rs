use std::time::Duration;
use chrono::{DateTime, Utc};

/// Get current wall-clock time for status snapshots
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format a delay as whole milliseconds for log lines
pub fn format_delay(delay: Duration) -> String {
    format!("{}ms", delay.as_millis())
}
