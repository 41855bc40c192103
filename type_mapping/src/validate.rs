//! Loose numeric parsing
//!
//! Stored rows arrive as text far more often than as typed numbers, so the
//! casts need the same forgiving number recognition the storage layer uses.

/// Check if a string is a complete numeric literal (leading whitespace allowed)
pub fn is_numeric_str(s: &str) -> bool {
    let trimmed = s.trim_start();
    if trimmed.is_empty() {
        return false;
    }
    // "inf"/"nan" parse as f64 but are not numbers as far as SQL is concerned
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return false;
    }
    trimmed.parse::<f64>().is_ok()
}

/// Parse the integer prefix of a string, returning 0 when there is none
pub fn parse_leading_int(s: &str) -> i64 {
    let trimmed = s.trim_start();
    if is_numeric_str(trimmed) {
        if let Ok(i) = trimmed.parse::<i64>() {
            return i;
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return f as i64;
        }
    }

    let mut end = 0;
    for (idx, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (idx == 0 && (c == '-' || c == '+')) {
            end = idx + c.len_utf8();
        } else {
            break;
        }
    }

    trimmed[..end].parse::<i64>().unwrap_or(0)
}

/// Parse the floating point prefix of a string, returning 0.0 when there is none
pub fn parse_leading_float(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut prev = '\0';

    for (idx, c) in trimmed.char_indices() {
        let accept = match c {
            '0'..='9' => true,
            '-' | '+' => idx == 0 || prev == 'e' || prev == 'E',
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exp && idx > 0 => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !accept {
            break;
        }
        prev = c;
        end = idx + c.len_utf8();
    }

    // Back off a dangling exponent marker or sign ("12e", "3e-")
    let mut candidate = &trimmed[..end];
    while !candidate.is_empty() && candidate.parse::<f64>().is_err() {
        candidate = &candidate[..candidate.len() - 1];
    }
    candidate.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_strings() {
        assert!(is_numeric_str("42"));
        assert!(is_numeric_str(" -3.5"));
        assert!(is_numeric_str("1e3"));
        assert!(!is_numeric_str(""));
        assert!(!is_numeric_str("12abc"));
        assert!(!is_numeric_str("inf"));
        assert!(!is_numeric_str("NaN"));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(parse_leading_int("42"), 42);
        assert_eq!(parse_leading_int("  7 apples"), 7);
        assert_eq!(parse_leading_int("-12x"), -12);
        assert_eq!(parse_leading_int("3.9"), 3);
        assert_eq!(parse_leading_int("abc"), 0);
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(parse_leading_float("2.5kg"), 2.5);
        assert_eq!(parse_leading_float("12e"), 12.0);
        assert_eq!(parse_leading_float("-0.25"), -0.25);
        assert_eq!(parse_leading_float("x"), 0.0);
    }
}
