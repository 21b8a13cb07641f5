pub mod blog;
pub mod user;

/// Microsecond precision keeps creation order stable within a second.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
