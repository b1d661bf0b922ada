//! Time helpers for the editing engine.
//! All timeline and source positions are `f64` seconds.

/// Time in seconds (timeline position, duration or source offset)
pub type Seconds = f64;

/// Tolerance used when comparing interval boundaries
pub const EPSILON: Seconds = 1e-9;

/// Check two times for equality within `EPSILON`
#[inline]
pub fn approx_eq(a: Seconds, b: Seconds) -> bool {
    (a - b).abs() <= EPSILON
}

/// Clamp a time into `[min, max]`, mapping NaN to `min`
#[inline]
pub fn clamp_time(value: Seconds, min: Seconds, max: Seconds) -> Seconds {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Convert seconds to whole milliseconds (rounded)
#[inline]
pub fn to_millis(seconds: Seconds) -> i64 {
    (seconds * 1000.0).round() as i64
}

/// Format time as HH:MM:SS.mmm
pub fn format_time(seconds: Seconds) -> String {
    let total_millis = to_millis(seconds.max(0.0));
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
