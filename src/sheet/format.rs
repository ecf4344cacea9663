//! Result formatting
//!
//! Values are shown with up to 15 significant digits and no trailing zeros.
//! Magnitudes below `1e-5` or at least `1e15` switch to scientific notation
//! with a signed, two-digit minimum exponent: `1.5E+20`, `1E-07`.

/// Significant digits kept when rendering a value
pub const SIGNIFICANT_DIGITS: usize = 15;

/// Smallest decimal exponent rendered in positional notation
const MIN_POSITIONAL_EXPONENT: i32 = -5;

pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let (digits, exponent) = significant_digits(value.abs());
    let sign = if value < 0.0 { "-" } else { "" };

    if exponent < MIN_POSITIONAL_EXPONENT || exponent >= SIGNIFICANT_DIGITS as i32 {
        let mantissa = match digits.split_at(1) {
            (lead, "") => lead.to_string(),
            (lead, rest) => format!("{}.{}", lead, rest),
        };
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}{}E{}{:02}", sign, mantissa, exponent_sign, exponent.abs());
    }

    format!("{}{}", sign, positional(&digits, exponent))
}

/// Round to [`SIGNIFICANT_DIGITS`] and return the digits with trailing zeros
/// removed, plus the decimal exponent of the first digit.
fn significant_digits(value: f64) -> (String, i32) {
    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent = exponent.parse::<i32>().unwrap_or(0);

    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    (digits, exponent)
}

fn positional(digits: &str, exponent: i32) -> String {
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{}{}", zeros, digits);
    }

    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        format!("{}{}", digits, "0".repeat(int_len - digits.len()))
    } else {
        format!("{}.{}", &digits[..int_len], &digits[int_len..])
    }
}
