//! Number parsing and formatting
//!
//! Scan values are plain `f64`. Two text conventions are used:
//! values taken from cells always show a decimal point (`1.0`, `0.25`),
//! while durations, timeouts and loop bounds are compact (`10`, `0.5`).

/// Magnitude above which whole numbers are no longer printed as integers
const WHOLE_LIMIT: f64 = 1e16;

/// Most decimals kept when rounding generated values
const MAX_DECIMALS: u32 = 15;

/// Parse number-looking text.
///
/// Accepts integers, decimals and scientific notation. Words such as
/// `inf` or `nan` are text, not numbers.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format with a decimal point: `1.0`, `0.9`, `-2.5`
pub fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < WHOLE_LIMIT {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}

/// Format whole numbers without decimal point: `10`, `0.5`
pub fn format_compact(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < WHOLE_LIMIT {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

/// Fixed six decimals: `0.100000`
pub fn format_fixed(x: f64) -> String {
    format!("{:.6}", x)
}

/// Number of decimals written in a numeric literal.
///
/// `"0.25"` has 2, `"5"` has 0, `"1.5e-3"` has 4.
pub fn decimal_places(text: &str) -> u32 {
    let text = text.trim();
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(pos) => (&text[..pos], text[pos + 1..].parse::<i32>().unwrap_or(0)),
        None => (text, 0),
    };
    let fraction = mantissa
        .split_once('.')
        .map(|(_, frac)| frac.len() as i32)
        .unwrap_or(0);
    (fraction - exponent).clamp(0, MAX_DECIMALS as i32) as u32
}

/// Round to a number of decimals, removing accumulated float noise
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let rounded = (x * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}
