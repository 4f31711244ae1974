//! Filter predicate composition over materialized person records.
//!
//! Matching is case-insensitive throughout. Facets are ANDed together and
//! compared exactly (after trimming and lowercasing); the free-text query is a
//! substring match ORed across [`Facet::SEARCHABLE`]. The death and disability
//! status facets compare as flags, so `Yes`, `y`, `true` and `1` are the same value.

use super::types::{parse_flag, Facet, FilterCriteria, PersonRecord};

/// Criteria with every value lowercased once up front
struct PreparedCriteria {
    query: Option<String>,
    facets: Vec<(Facet, String)>,
}

impl PreparedCriteria {
    fn new(criteria: &FilterCriteria) -> Self {
        Self {
            query: criteria.active_query().map(str::to_lowercase),
            facets: criteria
                .active_facets()
                .into_iter()
                .map(|(facet, value)| (facet, value.to_lowercase()))
                .collect(),
        }
    }

    fn matches(&self, record: &PersonRecord) -> bool {
        let facets_match = self
            .facets
            .iter()
            .all(|(facet, expected)| facet_matches(*facet, record.facet_value(*facet), expected));
        if !facets_match {
            return false;
        }

        match &self.query {
            None => true,
            Some(query) => Facet::SEARCHABLE.iter().any(|facet| {
                record
                    .facet_value(*facet)
                    .map(|value| value.to_lowercase().contains(query.as_str()))
                    .unwrap_or(false)
            }),
        }
    }
}

fn facet_matches(facet: Facet, actual: Option<&str>, expected: &str) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    if matches!(facet, Facet::DeathStatus | Facet::DisabilityStatus) {
        if let (Some(a), Some(e)) = (parse_flag(Some(actual)), parse_flag(Some(expected))) {
            return a == e;
        }
    }
    actual.trim().to_lowercase() == expected
}

/// Check a single record against the criteria
pub fn matches(record: &PersonRecord, criteria: &FilterCriteria) -> bool {
    PreparedCriteria::new(criteria).matches(record)
}

/// Return the records matching `criteria`, in input order. The input is never
/// modified; an empty criteria returns every record.
pub fn filter<'a>(records: &'a [PersonRecord], criteria: &FilterCriteria) -> Vec<&'a PersonRecord> {
    if criteria.is_empty() {
        return records.iter().collect();
    }
    let prepared = PreparedCriteria::new(criteria);
    records.iter().filter(|r| prepared.matches(r)).collect()
}
