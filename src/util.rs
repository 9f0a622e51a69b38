use std::time::Duration;

/// Round to two decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Seconds with up to three decimals and no trailing zeros, e.g. `12.5`
pub fn format_secs(elapsed: Duration) -> String {
    trim_decimal(format!("{:.3}", elapsed.as_secs_f64()))
}

/// Minutes with up to four decimals and no trailing zeros, e.g. `0.2083`
pub fn format_mins(elapsed: Duration) -> String {
    trim_decimal(format!("{:.4}", elapsed.as_secs_f64() / 60.0))
}

fn trim_decimal(s: String) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
