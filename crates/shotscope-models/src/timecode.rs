//! Time formatting for rulers, labels and detail views.

/// Format milliseconds as `MM:SS.mmm`.
///
/// Negative and non-finite inputs format as zero; minutes are not wrapped
/// at one hour.
///
/// # Examples
/// ```
/// use shotscope_models::timecode::format_ms;
/// assert_eq!(format_ms(0.0), "00:00.000");
/// assert_eq!(format_ms(61_250.0), "01:01.250");
/// ```
pub fn format_ms(ms: f64) -> String {
    let total = if ms.is_finite() && ms > 0.0 {
        ms.floor() as u64
    } else {
        0
    };
    let mins = total / 60_000;
    let secs = (total / 1000) % 60;
    let millis = total % 1000;
    format!("{:02}:{:02}.{:03}", mins, secs, millis)
}

/// Format milliseconds as seconds with one decimal, e.g. `"2.0s"`.
pub fn format_secs_short(ms: f64) -> String {
    let secs = if ms.is_finite() { ms / 1000.0 } else { 0.0 };
    format!("{:.1}s", secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(4100.0), "00:04.100");
        assert_eq!(format_ms(3_599_999.0), "59:59.999");
        assert_eq!(format_ms(3_600_000.0), "60:00.000");
        assert_eq!(format_ms(-5.0), "00:00.000");
        assert_eq!(format_ms(f64::NAN), "00:00.000");
    }

    #[test]
    fn test_format_secs_short() {
        assert_eq!(format_secs_short(2000.0), "2.0s");
        assert_eq!(format_secs_short(4260.0), "4.3s");
        assert_eq!(format_secs_short(f64::INFINITY), "0.0s");
    }
}
