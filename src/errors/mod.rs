mod error;

pub use error::{DomainError, ServiceError, SourceError, ValidationError};

/// Result type for record and facet source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
