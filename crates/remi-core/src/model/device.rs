// ── Device readings ──

/// Convert the raw temperature code to degrees Celsius:
/// `(raw - 115) / 2`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn temperature_celsius(raw: i64) -> f64 {
    (raw - 115) as f64 / 2.0
}

/// A firmware update is available when the server advertises a version
/// newer than the installed one. A missing current version counts as 0.
pub fn firmware_update_available(current: Option<i64>, latest: Option<i64>) -> bool {
    latest.is_some_and(|latest| current.unwrap_or(0) < latest)
}
