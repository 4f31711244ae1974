use crate::errors::{DomainError, DomainResult};
use crate::types::RowId;
use crate::validation::{common, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when a categorical field is absent from a record
pub const UNSPECIFIED: &str = "Unspecified";

/// Parse the backend's boolean-like flag tokens ("Yes"/"No" in practice).
/// Anything unrecognised reads as not set.
pub fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Denormalized address chain, village up to state/region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub village: Option<String>,
    /// Ward (towns) or village tract (rural)
    pub ward: Option<String>,
    pub township: Option<String>,
    pub district: Option<String>,
    pub state_region: Option<String>,
}

/// Resolved link from a person to their household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdRef {
    pub id: RowId,
    pub household_number: Option<String>,
}

/// PersonRecord - one registered individual as delivered by the record source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: RowId,
    #[serde(default)]
    pub name: Option<String>,
    /// Raw date string; age is derived per report and never stored
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// `None` when the household join failed to resolve
    #[serde(default)]
    pub household: Option<HouseholdRef>,
    #[serde(default)]
    pub is_deceased: Option<String>,
    #[serde(default)]
    pub is_disabled: Option<String>,
    #[serde(default)]
    pub disability_type: Option<String>,
    #[serde(default)]
    pub location: Location,
}

impl PersonRecord {
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            date_of_birth: None,
            gender: None,
            household: None,
            is_deceased: None,
            is_disabled: None,
            disability_type: None,
            location: Location::default(),
        }
    }

    pub fn deceased(&self) -> bool {
        parse_flag(self.is_deceased.as_deref()).unwrap_or(false)
    }

    pub fn disabled(&self) -> bool {
        parse_flag(self.is_disabled.as_deref()).unwrap_or(false)
    }

    pub fn household_id(&self) -> Option<&RowId> {
        self.household.as_ref().map(|h| &h.id)
    }

    /// Value of a facet on this record; `None` when the field (or the nested
    /// link carrying it) is missing
    pub fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Gender => self.gender.as_deref(),
            Facet::DeathStatus => self.is_deceased.as_deref(),
            Facet::DisabilityStatus => self.is_disabled.as_deref(),
            Facet::Village => self.location.village.as_deref(),
            Facet::Ward => self.location.ward.as_deref(),
            Facet::Township => self.location.township.as_deref(),
            Facet::District => self.location.district.as_deref(),
            Facet::StateRegion => self.location.state_region.as_deref(),
            Facet::HouseholdNumber => self
                .household
                .as_ref()
                .and_then(|h| h.household_number.as_deref()),
        }
    }
}

/// A single filterable attribute with exact-match semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Gender,
    DeathStatus,
    DisabilityStatus,
    Village,
    Ward,
    Township,
    District,
    StateRegion,
    HouseholdNumber,
}

impl Facet {
    pub const ALL: [Facet; 9] = [
        Facet::Gender,
        Facet::DeathStatus,
        Facet::DisabilityStatus,
        Facet::Village,
        Facet::Ward,
        Facet::Township,
        Facet::District,
        Facet::StateRegion,
        Facet::HouseholdNumber,
    ];

    /// Fields the free-text query is matched against
    pub const SEARCHABLE: [Facet; 6] = [
        Facet::Gender,
        Facet::Village,
        Facet::Ward,
        Facet::Township,
        Facet::District,
        Facet::StateRegion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Gender => "gender",
            Facet::DeathStatus => "death_status",
            Facet::DisabilityStatus => "disability_status",
            Facet::Village => "village",
            Facet::Ward => "ward",
            Facet::Township => "township",
            Facet::District => "district",
            Facet::StateRegion => "state_region",
            Facet::HouseholdNumber => "household_number",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gender" => Some(Facet::Gender),
            "death_status" | "is_deceased" => Some(Facet::DeathStatus),
            "disability_status" | "is_disabled" => Some(Facet::DisabilityStatus),
            "village" => Some(Facet::Village),
            "ward" | "village_tract" => Some(Facet::Ward),
            "township" => Some(Facet::Township),
            "district" => Some(Facet::District),
            "state_region" | "state" | "region" => Some(Facet::StateRegion),
            "household_number" | "household_no" => Some(Facet::HouseholdNumber),
            _ => None,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter for report queries: a free-text search plus exact-match facets.
///
/// Unset and empty facets never exclude a record.
///
/// ```rust
/// use vims_core::domains::person::FilterCriteria;
///
/// let criteria = FilterCriteria::new()
///     .with_township("Hpa-an")
///     .with_query("kyauk");
/// assert!(!criteria.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub query: Option<String>,
    pub gender: Option<String>,
    pub death_status: Option<String>,
    pub disability_status: Option<String>,
    pub village: Option<String>,
    pub ward: Option<String>,
    pub township: Option<String>,
    pub district: Option<String>,
    pub state_region: Option<String>,
    pub household_number: Option<String>,
}

impl FilterCriteria {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_gender(self, gender: &str) -> Self {
        self.with_facet(Facet::Gender, gender)
    }

    pub fn with_death_status(self, status: &str) -> Self {
        self.with_facet(Facet::DeathStatus, status)
    }

    pub fn with_disability_status(self, status: &str) -> Self {
        self.with_facet(Facet::DisabilityStatus, status)
    }

    pub fn with_village(self, village: &str) -> Self {
        self.with_facet(Facet::Village, village)
    }

    pub fn with_township(self, township: &str) -> Self {
        self.with_facet(Facet::Township, township)
    }

    pub fn with_household_number(self, number: &str) -> Self {
        self.with_facet(Facet::HouseholdNumber, number)
    }

    /// Set any facet
    pub fn with_facet(mut self, facet: Facet, value: &str) -> Self {
        *self.facet_slot(facet) = Some(value.to_string());
        self
    }

    /// Set a facet by its name as sent by the filter UI. Unknown names are a
    /// programming error on the caller's side and are rejected.
    pub fn with_named_facet(self, name: &str, value: &str) -> DomainResult<Self> {
        let facet = Facet::from_str(name)
            .ok_or_else(|| DomainError::UnknownFacet(name.to_string()))?;
        Ok(self.with_facet(facet, value))
    }

    /// Build criteria from name/value pairs, failing on the first unknown name
    pub fn from_pairs<'a, I>(pairs: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |criteria, (name, value)| match name {
                "query" | "search" => Ok(criteria.with_query(value)),
                _ => criteria.with_named_facet(name, value),
            })
    }

    pub fn facet(&self, facet: Facet) -> Option<&str> {
        let value = match facet {
            Facet::Gender => &self.gender,
            Facet::DeathStatus => &self.death_status,
            Facet::DisabilityStatus => &self.disability_status,
            Facet::Village => &self.village,
            Facet::Ward => &self.ward,
            Facet::Township => &self.township,
            Facet::District => &self.district,
            Facet::StateRegion => &self.state_region,
            Facet::HouseholdNumber => &self.household_number,
        };
        value.as_deref()
    }

    fn facet_slot(&mut self, facet: Facet) -> &mut Option<String> {
        match facet {
            Facet::Gender => &mut self.gender,
            Facet::DeathStatus => &mut self.death_status,
            Facet::DisabilityStatus => &mut self.disability_status,
            Facet::Village => &mut self.village,
            Facet::Ward => &mut self.ward,
            Facet::Township => &mut self.township,
            Facet::District => &mut self.district,
            Facet::StateRegion => &mut self.state_region,
            Facet::HouseholdNumber => &mut self.household_number,
        }
    }

    /// Facets carrying a non-blank value
    pub fn active_facets(&self) -> Vec<(Facet, &str)> {
        Facet::ALL
            .iter()
            .filter_map(|facet| {
                self.facet(*facet)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (*facet, v))
            })
            .collect()
    }

    /// Non-blank search query
    pub fn active_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Check if filter is empty (no filtering criteria)
    pub fn is_empty(&self) -> bool {
        self.active_query().is_none() && self.active_facets().is_empty()
    }
}

impl Validate for FilterCriteria {
    fn validate(&self) -> DomainResult<()> {
        if let Some(query) = &self.query {
            common::validate_search_query(query)?;
        }
        for (facet, value) in self.active_facets() {
            common::validate_facet_value(facet.as_str(), value)?;
        }
        Ok(())
    }
}

/// Distinct values offered by the filter UI, loaded once per report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub villages: Vec<String>,
    pub townships: Vec<String>,
    pub districts: Vec<String>,
    pub state_regions: Vec<String>,
    pub genders: Vec<String>,
    pub death_statuses: Vec<String>,
}

impl FacetOptions {
    /// Facets the filter UI populates from lookups
    pub const LOOKUP_FACETS: [Facet; 6] = [
        Facet::Village,
        Facet::Township,
        Facet::District,
        Facet::StateRegion,
        Facet::Gender,
        Facet::DeathStatus,
    ];

    pub fn set(&mut self, facet: Facet, values: Vec<String>) {
        match facet {
            Facet::Village => self.villages = values,
            Facet::Township => self.townships = values,
            Facet::District => self.districts = values,
            Facet::StateRegion => self.state_regions = values,
            Facet::Gender => self.genders = values,
            Facet::DeathStatus => self.death_statuses = values,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(Some("Yes")), Some(true));
        assert_eq!(parse_flag(Some(" no ")), Some(false));
        assert_eq!(parse_flag(Some("TRUE")), Some(true));
        assert_eq!(parse_flag(Some("unknown")), None);
        assert_eq!(parse_flag(None), None);
    }

    #[test]
    fn test_record_deserializes_with_missing_links() {
        let json = r#"{
            "id": 7,
            "date_of_birth": "1990-04-12",
            "gender": "M",
            "is_deceased": "No",
            "location": { "village": "Kyauk Taw", "township": "Hpa-an" }
        }"#;
        let record: PersonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RowId::Int(7));
        assert!(record.household.is_none());
        assert!(!record.deceased());
        assert!(!record.disabled());
        assert_eq!(record.facet_value(Facet::Township), Some("Hpa-an"));
        assert_eq!(record.facet_value(Facet::District), None);
        assert_eq!(record.facet_value(Facet::HouseholdNumber), None);
    }

    #[test]
    fn test_named_facets() {
        let criteria = FilterCriteria::new()
            .with_named_facet("village_tract", "Naung Lone")
            .unwrap();
        assert_eq!(criteria.facet(Facet::Ward), Some("Naung Lone"));

        let err = FilterCriteria::new().with_named_facet("blood_type", "O").unwrap_err();
        assert!(matches!(err, DomainError::UnknownFacet(name) if name == "blood_type"));

        let from_pairs = FilterCriteria::from_pairs([("query", "hpa"), ("gender", "F")]).unwrap();
        assert_eq!(from_pairs.active_query(), Some("hpa"));
        assert_eq!(from_pairs.facet(Facet::Gender), Some("F"));
        assert!(FilterCriteria::from_pairs([("colour", "red")]).is_err());
    }

    #[test]
    fn test_blank_values_are_inactive() {
        let criteria = FilterCriteria::new().with_query("   ").with_township("");
        assert!(criteria.is_empty());
        assert!(criteria.validate().is_ok());
    }

    #[test]
    fn test_criteria_validation_rejects_overlong_query() {
        let criteria = FilterCriteria::new().with_query(&"a".repeat(200));
        assert!(matches!(
            criteria.validate(),
            Err(DomainError::Validation(ValidationError::MaxLength { .. }))
        ));
    }
}
