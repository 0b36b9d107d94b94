use std::time::Duration;

/// Settle delay for a trimmed text of `len` chars.
///
/// Short texts wait longer (the user is likely still typing and a one-letter
/// query is expensive), long ones approach 300ms. An empty field waits 300ms.
pub fn settle_delay(len: usize) -> Duration {
    let secs = if len == 0 {
        0.3
    } else {
        1.0 / (6.0 * (len as f64 - 0.7)) + 0.3
    };
    Duration::from_secs_f64(secs.max(0.0))
}
