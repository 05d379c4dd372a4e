//! Wall-clock helpers.
//!
//! Session and message ids are the creation time in epoch milliseconds.
//! Two records created within the same millisecond share an id; nothing
//! here detects that.

use chrono::Utc;

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Id derived from the current wall-clock time.
pub fn wall_clock_id() -> String {
    now_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_id_is_numeric() {
        let id = wall_clock_id();
        assert!(id.parse::<i64>().is_ok());
    }
}
