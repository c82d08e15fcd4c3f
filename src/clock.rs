use axum::http::HeaderMap;
use chrono::Utc;
use tracing::warn;

/// Header carrying a simulated current time, honored only in test mode.
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn wall_clock_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// The time a fetch is evaluated at.
///
/// Creation never goes through here: a paste's `created_at` is always wall-clock time.
pub fn request_now(headers: &HeaderMap, test_mode: bool) -> i64 {
    if !test_mode {
        return wall_clock_ms();
    }
    let Some(value) = headers.get(TEST_NOW_HEADER) else {
        return wall_clock_ms();
    };
    match value.to_str().ok().and_then(|text| text.trim().parse().ok()) {
        Some(millis) => millis,
        None => {
            warn!("ignoring unparseable {TEST_NOW_HEADER} header: {value:?}");
            wall_clock_ms()
        }
    }
}
