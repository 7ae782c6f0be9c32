/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh opaque record id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Record id that sorts by creation within this process.
///
/// UUIDv7 strings compare in generation order, also inside one millisecond.
pub fn new_ordered_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Lower-case and trim an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
