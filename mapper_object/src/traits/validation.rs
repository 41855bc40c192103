//! Validation hooks

use crate::entity::Entity;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks an entity and reports every problem found
pub trait EntityValidator {
    fn validate(&self, entity: &Entity) -> Vec<FieldError>;
}

impl<F> EntityValidator for F
where
    F: Fn(&Entity) -> Vec<FieldError>,
{
    fn validate(&self, entity: &Entity) -> Vec<FieldError> {
        self(entity)
    }
}

/// Properties that must be present and non-empty
#[derive(Debug, Clone, Default)]
pub struct RequiredFields(pub Vec<String>);

impl RequiredFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }
}

impl EntityValidator for RequiredFields {
    fn validate(&self, entity: &Entity) -> Vec<FieldError> {
        self.0
            .iter()
            .filter(|field| {
                entity.get(field).map_or(true, |value| {
                    value.is_null() || value.as_str().is_some_and(|s| s.trim().is_empty())
                })
            })
            .map(|field| FieldError::new(field, format!("{} is required", field)))
            .collect()
    }
}

/// Something that can validate itself and remember the outcome
pub trait Validation {
    fn validate(&mut self) -> bool;
    fn is_valid(&self) -> bool;
    fn get_errors(&self) -> &[FieldError];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let validator = RequiredFields::new(["title", "slug"]);
        let entity = Entity::new().with("title", "  ").with("other", 1);
        let errors = validator.validate(&entity);
        assert_eq!(
            errors,
            vec![
                FieldError::new("title", "title is required"),
                FieldError::new("slug", "slug is required"),
            ]
        );

        let entity = Entity::new().with("title", "Gallery").with("slug", "gallery");
        assert!(validator.validate(&entity).is_empty());
    }

    #[test]
    fn test_closure_validator() {
        let validator = |entity: &Entity| -> Vec<FieldError> {
            match entity.get("views") {
                Some(views) if views.to_int() < 0 => vec![FieldError::new("views", "negative")],
                _ => Vec::new(),
            }
        };
        assert_eq!(validator.validate(&Entity::new().with("views", -1)).len(), 1);
        assert!(validator.validate(&Entity::new().with("views", 5)).is_empty());
    }
}
