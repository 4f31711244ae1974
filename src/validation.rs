use crate::errors::{ValidationError, DomainResult, DomainError};

/// A trait that entities should implement for validation.
pub trait Validate {
    /// Validates the entity and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self
    where T: Default + PartialEq {
        if self.value.is_none() || self.value == Some(T::default()) {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            // Return the first error for simplicity
            Some(first) => Err(DomainError::Validation(first)),
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    pub fn min_length(mut self, min: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() < min {
                self.errors.push(ValidationError::min_length(&self.field_name, min));
            }
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn not_blank(mut self) -> Self {
        if let Some(value) = &self.value {
            if value.trim().is_empty() {
                self.errors.push(ValidationError::required(&self.field_name));
            }
        }
        self
    }

    pub fn one_of(mut self, allowed_values: &[&str], message: Option<&str>) -> Self {
        if let Some(value) = &self.value {
            if !allowed_values.iter().any(|allowed| allowed.eq_ignore_ascii_case(value)) {
                let reason = message.unwrap_or("must be one of the allowed values");
                self.errors.push(ValidationError::invalid_value(&self.field_name, reason));
            }
        }
        self
    }
}

/// Numeric validations
impl<T> ValidationBuilder<T>
where T: PartialOrd + Clone + std::fmt::Display
{
    pub fn min(mut self, min: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    min.to_string(),
                    "maximum".to_string()
                ));
            }
        }
        self
    }

    pub fn range(mut self, min: T, max: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min || value > &max {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    min.to_string(),
                    max.to_string()
                ));
            }
        }
        self
    }
}

// Validation helpers shared by report inputs
pub mod common {
    use super::*;

    /// Longest free-text query accepted by the record search
    pub const MAX_SEARCH_LENGTH: usize = 100;

    /// Largest page the tabular breakdown will serve in one request
    pub const MAX_PAGE_SIZE: u32 = 500;

    pub fn validate_search_query(query: &str) -> DomainResult<()> {
        ValidationBuilder::new("query", Some(query.to_string()))
            .max_length(MAX_SEARCH_LENGTH)
            .validate()
    }

    pub fn validate_facet_value(field_name: &str, value: &str) -> DomainResult<()> {
        ValidationBuilder::new(field_name, Some(value.to_string()))
            .not_blank()
            .max_length(MAX_SEARCH_LENGTH)
            .validate()
    }

    pub fn validate_page_size(per_page: u32) -> DomainResult<()> {
        ValidationBuilder::new("per_page", Some(per_page))
            .range(1, MAX_PAGE_SIZE)
            .validate()
    }

    pub fn validate_page_number(page: u32) -> DomainResult<()> {
        ValidationBuilder::new("page", Some(page))
            .min(1)
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_builder() {
        let result = ValidationBuilder::new("name", Some("".to_string()))
            .required()
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("name", Some("Kyauk Taw".to_string()))
            .required()
            .min_length(2)
            .max_length(20)
            .validate();
        assert!(result.is_ok());

        let result = ValidationBuilder::new("age", Some(130))
            .range(0, 120)
            .validate();
        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::Range { .. }))
        ));
    }

    #[test]
    fn test_one_of_is_case_insensitive() {
        let check = |v: &str| {
            ValidationBuilder::new("bucket_order", Some(v.to_string()))
                .one_of(&["configured", "member_count"], None)
                .validate()
        };
        assert!(check("Configured").is_ok());
        assert!(check("MEMBER_COUNT").is_ok());
        assert!(check("alphabetical").is_err());
    }

    #[test]
    fn test_search_query_length_counts_characters() {
        // Burmese script is multi-byte; the limit applies to characters.
        let query = "ကျေးရွာ".repeat(10);
        assert!(common::validate_search_query(&query).is_ok());

        let too_long = "x".repeat(common::MAX_SEARCH_LENGTH + 1);
        assert!(common::validate_search_query(&too_long).is_err());
    }

    #[test]
    fn test_blank_facet_value_rejected() {
        assert!(common::validate_facet_value("township", "   ").is_err());
        assert!(common::validate_facet_value("township", "Hpa-an").is_ok());
    }

    #[test]
    fn test_page_bounds() {
        assert!(common::validate_page_size(0).is_err());
        assert!(common::validate_page_size(20).is_ok());
        assert!(common::validate_page_size(common::MAX_PAGE_SIZE + 1).is_err());
        assert!(common::validate_page_number(0).is_err());
        assert!(common::validate_page_number(3).is_ok());
    }
}
