pub mod filter;
pub mod repository;
pub mod types;

pub use filter::filter;
pub use repository::{FacetLookupSource, InMemoryPersonRepository, PersonRecordSource, RecordInclusion};
pub use types::{Facet, FacetOptions, FilterCriteria, HouseholdRef, Location, PersonRecord};
