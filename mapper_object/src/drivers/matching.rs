//! Value comparison shared by the in-memory drivers

use std::cmp::Ordering;
use type_mapping::Value;

/// Numeric comparison when both sides are numeric, text comparison otherwise
pub(crate) fn compare_values(left: &Value, right: &Value) -> Ordering {
    if left.is_numeric() && right.is_numeric() {
        left.to_float()
            .partial_cmp(&right.to_float())
            .unwrap_or(Ordering::Equal)
    } else {
        left.to_string().cmp(&right.to_string())
    }
}

pub(crate) fn loose_eq(left: &Value, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return left.is_null() && right.is_null();
    }
    compare_values(left, right) == Ordering::Equal
}

/// Case-insensitive SQL LIKE: `%` matches any run, `_` any single character
pub(crate) fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    like_from(&text, &pattern)
}

fn like_from(text: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('%', rest)) => (0..=text.len()).any(|skip| like_from(&text[skip..], rest)),
        Some(('_', rest)) => !text.is_empty() && like_from(&text[1..], rest),
        Some((c, rest)) => text.first() == Some(c) && like_from(&text[1..], rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_match() {
        assert!(like_match("Summer Holiday", "%holiday"));
        assert!(like_match("summer", "s_mmer"));
        assert!(like_match("summer", "%"));
        assert!(!like_match("summer", "winter%"));
    }

    #[test]
    fn test_loose_comparison() {
        assert!(loose_eq(&Value::from("5"), &Value::Int(5)));
        assert!(!loose_eq(&Value::Null, &Value::Int(0)));
        assert_eq!(
            compare_values(&Value::from("10"), &Value::from("9")),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::from("b"), &Value::from("a")),
            Ordering::Greater
        );
    }
}
