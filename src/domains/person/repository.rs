use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::RwLock;

use crate::domains::person::types::{Facet, FacetOptions, PersonRecord};
use crate::errors::{SourceError, SourceResult};

/// Which register a report reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordInclusion {
    /// Living residents
    Residents,
    /// Death register
    Deceased,
    /// Disability register (living and deceased)
    Disabled,
    /// Every record
    All,
}

impl RecordInclusion {
    pub fn includes(&self, record: &PersonRecord) -> bool {
        match self {
            RecordInclusion::Residents => !record.deceased(),
            RecordInclusion::Deceased => record.deceased(),
            RecordInclusion::Disabled => record.disabled(),
            RecordInclusion::All => true,
        }
    }
}

/// Supplies person records from the backend
#[async_trait]
pub trait PersonRecordSource: Send + Sync {
    async fn fetch_records(&self, inclusion: RecordInclusion) -> SourceResult<Vec<PersonRecord>>;
}

/// Supplies distinct values for the filter UI
#[async_trait]
pub trait FacetLookupSource: Send + Sync {
    async fn distinct_values(&self, facet: Facet) -> SourceResult<Vec<String>>;

    /// Load every lookup list the filter UI needs. The lookups are independent
    /// and run concurrently.
    async fn facet_options(&self) -> SourceResult<FacetOptions> {
        let lookups = FacetOptions::LOOKUP_FACETS
            .into_iter()
            .map(|facet| async move { Ok::<_, SourceError>((facet, self.distinct_values(facet).await?)) });
        let results = try_join_all(lookups).await?;

        let mut options = FacetOptions::default();
        for (facet, values) in results {
            options.set(facet, values);
        }
        Ok(options)
    }
}

/// Record and facet source over an in-process list; used by tests and the
/// preview binary in place of the hosted backend
#[derive(Debug, Default)]
pub struct InMemoryPersonRepository {
    records: RwLock<Vec<PersonRecord>>,
}

impl InMemoryPersonRepository {
    pub fn new(records: Vec<PersonRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn insert(&self, record: PersonRecord) -> SourceResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| SourceError::Other("record store lock poisoned".to_string()))?;
        records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PersonRecordSource for InMemoryPersonRepository {
    async fn fetch_records(&self, inclusion: RecordInclusion) -> SourceResult<Vec<PersonRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| SourceError::Fetch("record store lock poisoned".to_string()))?;
        Ok(records
            .iter()
            .filter(|r| inclusion.includes(r))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FacetLookupSource for InMemoryPersonRepository {
    async fn distinct_values(&self, facet: Facet) -> SourceResult<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| SourceError::Fetch("record store lock poisoned".to_string()))?;
        let values: BTreeSet<String> = records
            .iter()
            .filter_map(|r| r.facet_value(facet))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        Ok(values.into_iter().collect())
    }
}
