//! Locale-tolerant number parsing and report number formatting.
//!
//! Bedside forms are filled in with either `1,5` or `1.5`, sometimes with units typed into the
//! field. [`parse_number`] accepts both separators and ignores stray characters. Every number in
//! a report goes through [`format_number`] so that copy-pasted reports look the same everywhere.

/// Parses a number written with either a comma or a dot as decimal separator.
///
/// Characters other than digits, `.` and `-` are discarded and the longest numeric prefix of what
/// remains is parsed, so `"70 kg"` yields `70` and `"1.2.3"` yields `1.2`.
///
/// Returns `None` for blank input, when no digits are left, or when the value overflows `f64`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let normalised: String = raw
        .chars()
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    leading_number(&normalised)
}

/// Parses a comma-separated list of numbers, dropping entries that do not parse.
///
/// Commas are list separators here, so entries cannot use a comma decimal separator.
pub fn parse_number_list(raw: &str) -> Vec<f64> {
    raw.split(',').filter_map(parse_number).collect()
}

/// Formats a number for display in a report.
///
/// Whole numbers are rendered without a fractional part; everything else with exactly two
/// decimals. Rounding works on the exact binary value, so `1.115` (stored just below the tie)
/// becomes `1.11`. Values that sit exactly on a tie, such as `0.125`, round away from zero.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    if value.fract() == 0.0 {
        // -0.0 has no fractional part but Display renders it as "-0".
        if value == 0.0 {
            return "0".to_string();
        }
        return format!("{}", value);
    }

    let scaled = value * 100.0;
    // Residual of the multiplication, exact thanks to the fused multiply-add.
    let residual = value.mul_add(100.0, -scaled);
    if residual == 0.0 && scaled.fract().abs() == 0.5 {
        return format!("{:.2}", scaled.round() / 100.0);
    }

    format!("{:.2}", value)
}

fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = frac_end - end - 1;
        if frac_digits > 0 {
            end = frac_end;
        }
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
