//! Identifier validation
//!
//! Table and column names reach SQL text through backtick quoting, so reserved
//! words are allowed; everything else must be a plain MySQL identifier.

use std::fmt;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    InvalidCharacters(String),
    /// Name is too long (MySQL limit is 64 characters)
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with a digit
    InvalidStartCharacter(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters and underscores are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// MySQL identifier length limit
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            name: name.to_string(),
            length: name.len(),
            max_length: MAX_IDENTIFIER_LENGTH,
        });
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidStartCharacter(name.to_string()));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters(name.to_string()));
    }

    Ok(())
}

/// A validated table name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Backtick-quoted form
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated column name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedColumnName(String);

impl ValidatedColumnName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl fmt::Display for ValidatedColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strip statement terminators and quoting characters from a caller-supplied
/// column or direction before it is spliced into SQL text
pub fn clean_column(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '\'' | '"' | '`'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["wp_posts", "wp_ngg_gallery", "_private", "order", "ID", "a"] {
            assert!(ValidatedTableName::new(name).is_ok(), "{name} should be valid");
            assert!(ValidatedColumnName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(ValidatedTableName::new(""), Err(ValidationError::Empty));
        assert!(matches!(
            ValidatedColumnName::new("1column"),
            Err(ValidationError::InvalidStartCharacter(_))
        ));
        assert!(matches!(
            ValidatedColumnName::new("name`; DROP TABLE wp_posts"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            ValidatedTableName::new(&"t".repeat(65)),
            Err(ValidationError::TooLong { length: 65, .. })
        ));
    }

    #[test]
    fn test_quoted() {
        let column = ValidatedColumnName::new("sortorder").unwrap();
        assert_eq!(column.quoted(), "`sortorder`");
        assert_eq!(column.to_string(), "sortorder");
    }

    #[test]
    fn test_clean_column() {
        assert_eq!(clean_column("`title`; DROP"), "title DROP");
        assert_eq!(clean_column("\"name'\""), "name");
        assert_eq!(clean_column("DESC"), "DESC");
    }
}
