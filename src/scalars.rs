//! Scalar text coercion, shared by the marshaller and the dynamic value
//! model. YAML 1.2 core schema: `true`/`false` booleans, decimal / hex /
//! octal integers, floats with the `.inf`/`.nan` specials.

/// Parse a YAML 1.2 boolean.
///
/// Returns:
/// - Ok(true/false) on success
/// - Err(..) if the input is not a YAML 1.2 boolean literal
pub(crate) fn parse_yaml12_bool(s: &str) -> Result<bool, String> {
    match s.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        _ => Err(format!("invalid boolean: `{s}`")),
    }
}

/// Parse a YAML 1.2 integer (decimal, `0x` hex, or `0o` octal).
pub(crate) fn parse_yaml12_int(s: &str) -> Result<i64, String> {
    let t = s.trim();
    let (neg, rest) = match t.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let parsed = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else if let Some(oct) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8)
    } else if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid integer: `{s}`"));
    } else {
        rest.parse::<i64>()
    };
    let magnitude = parsed.map_err(|_| format!("invalid integer: `{s}`"))?;
    Ok(if neg { -magnitude } else { magnitude })
}

/// Parse a YAML 1.2 float, including the `.inf` / `.nan` specials.
pub(crate) fn parse_yaml12_float(s: &str) -> Result<f64, String> {
    let t = s.trim();
    match t.to_ascii_lowercase().as_str() {
        ".nan" | "+.nan" | "-.nan" => Ok(f64::NAN),
        ".inf" | "+.inf" => Ok(f64::INFINITY),
        "-.inf" => Ok(f64::NEG_INFINITY),
        _ => t
            .parse::<f64>()
            .map_err(|_| format!("invalid floating point value: `{s}`")),
    }
}

/// True when plain scalar text reads as a number under the core schema.
/// Used by the emitters to decide quoting and JSON literal emission.
pub(crate) fn looks_like_number(s: &str) -> bool {
    parse_yaml12_int(s).is_ok() || {
        // Floats, but not the words YAML would not resolve as numbers.
        !s.is_empty()
            && s.bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
            && s.parse::<f64>().is_ok()
    }
}

/// Format a float the YAML way via `zmij` (shortest text that round-trips),
/// patched so bare exponents still carry a decimal point (`4e-6` → `4.0e-6`).
pub(crate) fn format_float(f: f64) -> String {
    use num_traits::float::FloatCore;
    use zmij::Float;

    if FloatCore::is_nan(f) {
        return ".nan".to_owned();
    }
    if f.is_infinite() {
        return if f.is_sign_positive() { ".inf" } else { "-.inf" }.to_owned();
    }
    let mut buf = zmij::Buffer::new();
    let s = buf.format_finite(f);
    if !s.as_bytes().contains(&b'.') {
        if let Some(exp_pos) = s.find('e').or_else(|| s.find('E')) {
            format!("{}.0{}", &s[..exp_pos], &s[exp_pos..])
        } else {
            format!("{s}.0")
        }
    } else {
        s.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml12_bools_are_strict() {
        assert_eq!(parse_yaml12_bool("true"), Ok(true));
        assert_eq!(parse_yaml12_bool("False"), Ok(false));
        // The 1.1 forms are strings under 1.2.
        assert!(parse_yaml12_bool("yes").is_err());
        assert!(parse_yaml12_bool("off").is_err());
    }

    #[test]
    fn integers_with_bases() {
        assert_eq!(parse_yaml12_int("42"), Ok(42));
        assert_eq!(parse_yaml12_int("-7"), Ok(-7));
        assert_eq!(parse_yaml12_int("0x1F"), Ok(31));
        assert_eq!(parse_yaml12_int("0o17"), Ok(15));
        assert!(parse_yaml12_int("1.5").is_err());
    }

    #[test]
    fn float_specials() {
        assert!(parse_yaml12_float(".nan").unwrap().is_nan());
        assert_eq!(parse_yaml12_float("-.inf").unwrap(), f64::NEG_INFINITY);
        assert_eq!(parse_yaml12_float("2.5").unwrap(), 2.5);
    }

    #[test]
    fn float_formatting_keeps_decimal_point() {
        assert_eq!(format_float(1.0), "1.0");
        assert!(format_float(0.000004).contains('.'));
    }

    #[test]
    fn number_detection() {
        assert!(looks_like_number("42"));
        assert!(looks_like_number("1.5"));
        assert!(!looks_like_number("2.0.0"));
        assert!(!looks_like_number("v1"));
    }
}
