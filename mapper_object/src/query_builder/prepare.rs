//! Placeholder substitution for SQL templates
//!
//! `%s` becomes a quoted, escaped string, `%d` an integer, `%f` a float and
//! `%%` a literal percent sign. Any other `%` sequence is copied unchanged.

use type_mapping::Value;

/// One positional argument for [`prepare_args`]
#[derive(Debug, Clone, PartialEq)]
pub enum BindArg {
    Value(Value),
    /// Already-rendered SQL, spliced in verbatim whatever the placeholder
    Raw(String),
}

/// Escape a string for use between single quotes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '\'' | '"' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Undo one level of [`escape`]: `\\`, `\'` and `\"` lose their backslash
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '\\' | '\'' | '"') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Substitute plain values into a template
pub fn prepare(template: &str, args: &[Value]) -> String {
    let args: Vec<BindArg> = args.iter().cloned().map(BindArg::Value).collect();
    prepare_args(template, &args)
}

pub fn prepare_args(template: &str, args: &[BindArg]) -> String {
    // quotes around %s are supplied by the substitution itself
    let template = template.replace("'%s'", "%s").replace("\"%s\"", "%s");

    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(conv @ ('s' | 'd' | 'f' | 'F')) => {
                chars.next();
                match args.next() {
                    Some(BindArg::Raw(sql)) => out.push_str(sql),
                    Some(BindArg::Value(value)) => out.push_str(&render(conv, value)),
                    None => out.push_str(&render(conv, &Value::Null)),
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

fn render(conv: char, value: &Value) -> String {
    match conv {
        'd' => value.to_int().to_string(),
        'f' | 'F' => value.to_float().to_string(),
        _ => format!("'{}'", escape(&value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_placeholders() {
        let sql = prepare(
            "SELECT * FROM t WHERE name = %s AND views > %d AND ratio < %f",
            &[Value::from("O'Brien"), Value::from("100abc"), Value::from(0.5)],
        );
        assert_eq!(
            sql,
            r"SELECT * FROM t WHERE name = 'O\'Brien' AND views > 100 AND ratio < 0.5"
        );
    }

    #[test]
    fn test_literal_percent_and_unknown_sequences() {
        let sql = prepare("title LIKE %s AND x = '100%%' AND y = %z", &[Value::from("%cat%")]);
        assert_eq!(sql, "title LIKE '%cat%' AND x = '100%' AND y = %z");
    }

    #[test]
    fn test_pre_quoted_placeholder() {
        assert_eq!(prepare("status = '%s'", &[Value::from("draft")]), "status = 'draft'");
    }

    #[test]
    fn test_raw_args_are_spliced() {
        let sql = prepare_args(
            "gid IN (%d) AND slug IN (%s)",
            &[BindArg::Raw("1,2,3".to_string()), BindArg::Raw("'a','b'".to_string())],
        );
        assert_eq!(sql, "gid IN (1,2,3) AND slug IN ('a','b')");
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let original = r#"say "hi" to O'Brien \ co"#;
        assert_eq!(unescape(&escape(original)), original);
        assert_eq!(unescape(r"C:\\path"), r"C:\path");
        assert_eq!(unescape(r"tab\t stays"), r"tab\t stays");
    }

    #[test]
    fn test_missing_args() {
        assert_eq!(prepare("a = %s AND b = %d", &[]), "a = '' AND b = 0");
    }
}
