//! Shared utility functions.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::time::Duration;

/// Formats a timestamp for display.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Formats a duration as seconds with one decimal, e.g. `2.0`.
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.1}", duration.as_secs_f64())
}

/// Extracts the message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(timestamp), "2024-01-01 12:00:00 UTC");
    }

    #[test]
    fn test_format_seconds_rounds_to_one_decimal() {
        assert_eq!(format_seconds(Duration::from_millis(2000)), "2.0");
        assert_eq!(format_seconds(Duration::from_millis(1949)), "1.9");
        assert_eq!(format_seconds(Duration::from_millis(50)), "0.1");
    }

    #[test]
    fn test_panic_message_variants() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");

        let payload: Box<dyn Any + Send> = Box::new(17_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
