use std::fmt;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the record and facet sources (the backend data-access layer)
#[derive(Debug, Error, Clone)]
pub enum SourceError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected by backend: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Record not found: {0} with ID {1}")]
    NotFound(String, String),

    #[error("Source error: {0}")]
    Other(String),
}

impl SourceError {
    /// Message field handed to the presentation layer
    pub fn message(&self) -> String {
        match self {
            SourceError::Fetch(s)
            | SourceError::Unavailable(s)
            | SourceError::Rejected(s)
            | SourceError::MalformedResponse(s)
            | SourceError::Other(s) => s.clone(),
            SourceError::NotFound(entity, id) => format!("{} with ID {}", entity, id),
        }
    }
}

impl serde::Serialize for SourceError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("SourceError", 2)?;
        let kind = match self {
            SourceError::Fetch(_) => "Fetch",
            SourceError::Unavailable(_) => "Unavailable",
            SourceError::Rejected(_) => "Rejected",
            SourceError::MalformedResponse(_) => "MalformedResponse",
            SourceError::NotFound(_, _) => "NotFound",
            SourceError::Other(_) => "Other",
        };
        state.serialize_field("type", kind)?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// Domain-level errors
#[derive(Debug, Error, Clone, Serialize)]
pub enum DomainError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Bucket definitions, facet names and report views that cannot produce
    /// a correct report. Raised before any output is built.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    #[error("Age {age} does not fall in any configured bucket")]
    UnbucketedAge {
        age: u32,
    },
}

impl DomainError {
    pub fn configuration(message: &str) -> Self {
        DomainError::Configuration(message.to_string())
    }
}

/// Service-level errors (application specific)
#[derive(Debug, Error, Clone, Serialize)]
pub enum ServiceError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl From<SourceError> for ServiceError {
    fn from(error: SourceError) -> Self {
        ServiceError::Domain(DomainError::Source(error))
    }
}

impl From<ValidationError> for ServiceError {
    fn from(error: ValidationError) -> Self {
        ServiceError::Domain(DomainError::Validation(error))
    }
}

/// Validation errors
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required {
        field: String,
    },

    #[error("Field '{field}' must be at least {min} characters")]
    MinLength {
        field: String,
        min: usize,
    },

    #[error("Field '{field}' cannot exceed {max} characters")]
    MaxLength {
        field: String,
        max: usize,
    },

    #[error("Field '{field}' must be between {min} and {max}")]
    Range {
        field: String,
        min: String,
        max: String,
    },

    #[error("Field '{field}' contains invalid format: {reason}")]
    Format {
        field: String,
        reason: String,
    },

    #[error("Field '{field}' contains an invalid value: {reason}")]
    InvalidValue {
        field: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Custom(String),
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    pub fn min_length(field: &str, min: usize) -> Self {
        Self::MinLength {
            field: field.to_string(),
            min,
        }
    }

    pub fn max_length(field: &str, max: usize) -> Self {
        Self::MaxLength {
            field: field.to_string(),
            max,
        }
    }

    pub fn range<T: fmt::Display>(field: &str, min: T, max: T) -> Self {
        Self::Range {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn format(field: &str, reason: &str) -> Self {
        Self::Format {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn custom(message: &str) -> Self {
        Self::Custom(message.to_string())
    }
}
