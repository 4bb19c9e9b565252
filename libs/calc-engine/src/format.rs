//! Result formatting
//!
//! Formatting is owned by the caller of the evaluator, not by the evaluator itself,
//! so a result computed remotely renders identically to one computed locally.
//!
//! | Input | Rendering |
//! |-------|-----------|
//! | NaN | `undefined` |
//! | +∞ / −∞ | `∞` / `-∞` |
//! | `0 < |x| < 1e-10` | exponential, 3 significant digits (`1.00e-15`) |
//! | `|x| > 1e12` | exponential, 6 significant digits (`1.00000e+13`) |
//! | otherwise | rounded to 10 decimals, no trailing zeros (`0.3`, `8`) |
//! | complex | `<re> + <im>i`, or `<re>` when the imaginary part is zero |

use crate::value::Value;

/// Sentinel shown for NaN results
pub const UNDEFINED: &str = "undefined";
/// Sentinel shown for positive infinity
pub const POSITIVE_INFINITY: &str = "∞";
/// Sentinel shown for negative infinity
pub const NEGATIVE_INFINITY: &str = "-∞";

const SMALL_MAGNITUDE: f64 = 1e-10;
const LARGE_MAGNITUDE: f64 = 1e12;
const SMALL_PRECISION: usize = 3;
const LARGE_PRECISION: usize = 6;
const DECIMAL_SCALE: f64 = 1e10;

/// Format an evaluation result for display
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Real(n) => format_number(*n),
        Value::Complex(re, im) if *im == 0.0 => format_number(*re),
        Value::Complex(re, im) => format!("{} + {}i", format_number(*re), format_number(*im)),
        Value::Text(text) => text.clone(),
    }
}

/// Format a real number for display
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return UNDEFINED.to_string();
    }
    if n.is_infinite() {
        let sentinel = if n > 0.0 {
            POSITIVE_INFINITY
        } else {
            NEGATIVE_INFINITY
        };
        return sentinel.to_string();
    }

    let magnitude = n.abs();
    if magnitude < SMALL_MAGNITUDE && n != 0.0 {
        return exponential(n, SMALL_PRECISION);
    }
    if magnitude > LARGE_MAGNITUDE {
        return exponential(n, LARGE_PRECISION);
    }

    let rounded = (n * DECIMAL_SCALE).round() / DECIMAL_SCALE;
    if rounded == 0.0 {
        // also folds -0 into 0
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Exponential notation with `precision` significant digits and a signed exponent
fn exponential(n: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision.saturating_sub(1), n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        },
        _ => formatted,
    }
}

/// Parse a displayed result back into a value
///
/// Accepts everything [`format_value`] produces, including the sentinels and the
/// `<re> + <im>i` complex form.
pub fn parse_numeric(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Some((re, im)) = text.split_once(" + ") {
        let im = im.strip_suffix('i')?;
        return Some(Value::Complex(parse_real(re)?, parse_real(im)?));
    }
    parse_real(text).map(Value::Real)
}

fn parse_real(text: &str) -> Option<f64> {
    match text.trim() {
        UNDEFINED => Some(f64::NAN),
        POSITIVE_INFINITY => Some(f64::INFINITY),
        NEGATIVE_INFINITY => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}
