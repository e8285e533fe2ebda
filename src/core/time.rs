use chrono::{DateTime, Local, Utc};

/// Current time, pinned by `OSINT_FIXED_TIME` (RFC 3339) when set.
pub fn now_utc() -> DateTime<Utc> {
    if let Ok(value) = std::env::var("OSINT_FIXED_TIME") {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return dt.with_timezone(&Utc);
        }
    }
    Utc::now()
}

/// Wall-clock stamp used on activity log lines.
pub fn clock_stamp() -> String {
    now_utc().with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub fn epoch_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}
