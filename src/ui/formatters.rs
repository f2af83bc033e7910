//! Shared formatting utilities for UI components.

/// Format a number with thousand separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Field strength readout, `--` before the first value.
pub fn format_field(val: Option<f64>) -> String {
    match val {
        Some(v) if v.is_finite() => format!("{:.2} mT", v),
        Some(v) => format!("{} mT", non_finite(v)),
        None => "-- mT".to_string(),
    }
}

/// Whole-number readout (RPM, kV).
pub fn format_whole(val: Option<f64>) -> String {
    match val {
        Some(v) if v.is_finite() => format!("{:.0}", v.round()),
        Some(v) => non_finite(v).to_string(),
        None => "--".to_string(),
    }
}

fn non_finite(v: f64) -> &'static str {
    if v.is_nan() {
        "NaN"
    } else if v > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}

/// Format axis label with smart precision.
pub fn format_axis_label(val: f64) -> String {
    if !val.is_finite() {
        return "?".to_string();
    }
    let abs_val = val.abs();
    if abs_val == 0.0 {
        "0".to_string()
    } else if !(1e-2..1e5).contains(&abs_val) {
        format!("{:.1e}", val)
    } else if abs_val >= 100.0 {
        format!("{:.0}", val)
    } else if abs_val >= 1.0 {
        format!("{:.1}", val)
    } else {
        format!("{:.2}", val)
    }
}
