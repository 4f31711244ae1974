use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::domains::person::FacetOptions;
use crate::errors::{DomainError, DomainResult};

/// Upper bounds of the standard dashboard buckets; the last bucket is open-ended
pub const STANDARD_UPPER_BOUNDS: [u32; 7] = [10, 20, 30, 40, 50, 60, 70];

/// One age range with inclusive bounds. `max_age: None` means unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBucket {
    pub label: String,
    pub min_age: u32,
    pub max_age: Option<u32>,
}

impl AgeBucket {
    pub fn new(label: &str, min_age: u32, max_age: Option<u32>) -> Self {
        Self {
            label: label.to_string(),
            min_age,
            max_age,
        }
    }

    pub fn contains(&self, age: u32) -> bool {
        age >= self.min_age && self.max_age.map_or(true, |max| age <= max)
    }
}

/// Ordered, validated list of age buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBucketDefinition {
    buckets: Vec<AgeBucket>,
}

impl AgeBucketDefinition {
    /// Build a definition that partitions every non-negative age: the first
    /// bucket starts at 0, buckets are contiguous and the last one is unbounded.
    pub fn new(buckets: Vec<AgeBucket>) -> DomainResult<Self> {
        let definition = Self::partial(buckets)?;
        let first = &definition.buckets[0];
        if first.min_age != 0 {
            return Err(DomainError::Configuration(format!(
                "First bucket '{}' must start at age 0",
                first.label
            )));
        }
        if let Some(last) = definition.buckets.last() {
            if last.max_age.is_some() {
                return Err(DomainError::Configuration(format!(
                    "Last bucket '{}' must be unbounded above",
                    last.label
                )));
            }
        }
        Ok(definition)
    }

    /// Build a definition covering a contiguous sub-range of ages. Ages outside
    /// the range are handled by the caller's [`UnbucketedPolicy`].
    pub fn partial(buckets: Vec<AgeBucket>) -> DomainResult<Self> {
        if buckets.is_empty() {
            return Err(DomainError::configuration("Bucket definition is empty"));
        }

        let mut labels = HashSet::new();
        for bucket in &buckets {
            if bucket.label.trim().is_empty() {
                return Err(DomainError::configuration("Bucket labels must not be empty"));
            }
            if !labels.insert(bucket.label.as_str()) {
                return Err(DomainError::Configuration(format!(
                    "Duplicate bucket label '{}'",
                    bucket.label
                )));
            }
            if let Some(max) = bucket.max_age {
                if max < bucket.min_age {
                    return Err(DomainError::Configuration(format!(
                        "Bucket '{}' has max age {} below min age {}",
                        bucket.label, max, bucket.min_age
                    )));
                }
            }
        }

        for pair in buckets.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            match prev.max_age {
                None => {
                    return Err(DomainError::Configuration(format!(
                        "Unbounded bucket '{}' must be last",
                        prev.label
                    )))
                }
                Some(max) if max.checked_add(1) != Some(next.min_age) => {
                    let problem = if next.min_age <= max { "overlaps" } else { "leaves a gap after" };
                    return Err(DomainError::Configuration(format!(
                        "Bucket '{}' {} bucket '{}'",
                        next.label, problem, prev.label
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self { buckets })
    }

    /// Build `≤a, (a+1)-b, ..., ≥(z+1)` from strictly increasing upper bounds
    pub fn from_upper_bounds(bounds: &[u32]) -> DomainResult<Self> {
        Self::new(Self::buckets_from_bounds(bounds))
    }

    /// The dashboards' standard `≤10, 11-20, ..., 61-70, ≥71` buckets
    pub fn standard() -> Self {
        Self {
            buckets: Self::buckets_from_bounds(&STANDARD_UPPER_BOUNDS),
        }
    }

    fn buckets_from_bounds(bounds: &[u32]) -> Vec<AgeBucket> {
        let mut buckets = Vec::with_capacity(bounds.len() + 1);
        let mut next_min = 0;
        for (i, &upper) in bounds.iter().enumerate() {
            let label = if i == 0 {
                format!("≤{}", upper)
            } else {
                format!("{}-{}", next_min, upper)
            };
            buckets.push(AgeBucket::new(&label, next_min, Some(upper)));
            next_min = upper.saturating_add(1);
        }
        let open_label = if bounds.is_empty() {
            "All ages".to_string()
        } else {
            format!("≥{}", next_min)
        };
        buckets.push(AgeBucket::new(&open_label, next_min, None));
        buckets
    }

    pub fn buckets(&self) -> &[AgeBucket] {
        &self.buckets
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    /// Position of the bucket containing `age`
    pub fn index_of(&self, age: u32) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(age))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for AgeBucketDefinition {
    fn default() -> Self {
        Self::standard()
    }
}

/// Aggregated counts for one age bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub member_count: u64,
    pub male_count: u64,
    pub female_count: u64,
    pub unique_household_count: u64,
    /// Unrounded mean age; 0.0 for an empty bucket
    pub average_age: f64,
}

/// A labelled bucket row as shown in tables and charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRow {
    pub label: String,
    pub stats: BucketStats,
}

/// Per-bucket statistics in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketedStats {
    pub rows: Vec<BucketRow>,
}

impl BucketedStats {
    pub fn get(&self, label: &str) -> Option<&BucketStats> {
        self.rows.iter().find(|r| r.label == label).map(|r| &r.stats)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketRow> {
        self.rows.iter()
    }

    pub fn total_members(&self) -> u64 {
        self.rows.iter().map(|r| r.stats.member_count).sum()
    }

    /// Reorder rows for display. The sort is stable, so member-count ties keep
    /// their configured order.
    pub fn sorted(&self, order: BucketOrder) -> BucketedStats {
        let mut rows = self.rows.clone();
        if order == BucketOrder::MemberCountDesc {
            rows.sort_by(|a, b| b.stats.member_count.cmp(&a.stats.member_count));
        }
        BucketedStats { rows }
    }
}

/// The two locale-specific gender tokens counted as male and female
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderTokens {
    pub male: String,
    pub female: String,
}

impl GenderTokens {
    pub fn new(male: &str, female: &str) -> Self {
        Self {
            male: male.to_string(),
            female: female.to_string(),
        }
    }

    pub fn is_male(&self, token: &str) -> bool {
        token == self.male
    }

    pub fn is_female(&self, token: &str) -> bool {
        token == self.female
    }
}

impl Default for GenderTokens {
    fn default() -> Self {
        Self::new("ကျား", "မ")
    }
}

/// Display order of bucket rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    /// Definition order
    Configured,
    /// Descending member count, ties in definition order
    MemberCountDesc,
}

impl BucketOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketOrder::Configured => "configured",
            BucketOrder::MemberCountDesc => "member_count",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "configured" => Some(BucketOrder::Configured),
            "member_count" | "member_count_desc" => Some(BucketOrder::MemberCountDesc),
            _ => None,
        }
    }
}

/// How the two-slice gender chart is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderRatioMode {
    /// `[total_male, total_female]`
    #[default]
    ExplicitCounts,
    /// `[total_population - total_female, total_female]`
    TotalMinusFemale,
}

impl GenderRatioMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderRatioMode::ExplicitCounts => "explicit_counts",
            GenderRatioMode::TotalMinusFemale => "total_minus_female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "explicit_counts" | "explicit" => Some(GenderRatioMode::ExplicitCounts),
            "total_minus_female" => Some(GenderRatioMode::TotalMinusFemale),
            _ => None,
        }
    }
}

/// What happens to an age that no bucket contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnbucketedPolicy {
    #[default]
    Drop,
    Reject,
}

impl UnbucketedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnbucketedPolicy::Drop => "drop",
            UnbucketedPolicy::Reject => "reject",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Some(UnbucketedPolicy::Drop),
            "reject" => Some(UnbucketedPolicy::Reject),
            _ => None,
        }
    }
}

/// A per-bucket value a report view can chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketMetric {
    Members,
    Male,
    Female,
    Households,
    AverageAge,
}

impl BucketMetric {
    pub const ALL: [BucketMetric; 5] = [
        BucketMetric::Members,
        BucketMetric::Male,
        BucketMetric::Female,
        BucketMetric::Households,
        BucketMetric::AverageAge,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BucketMetric::Members => "Members",
            BucketMetric::Male => "Male",
            BucketMetric::Female => "Female",
            BucketMetric::Households => "Households",
            BucketMetric::AverageAge => "Average age",
        }
    }

    pub fn value(&self, stats: &BucketStats) -> f64 {
        match self {
            BucketMetric::Members => stats.member_count as f64,
            BucketMetric::Male => stats.male_count as f64,
            BucketMetric::Female => stats.female_count as f64,
            BucketMetric::Households => stats.unique_household_count as f64,
            BucketMetric::AverageAge => stats.average_age,
        }
    }
}

impl fmt::Display for BucketMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Population-wide totals over the bucketed (post-filter) records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicSummary {
    pub total_population: u64,
    pub total_male: u64,
    pub total_female: u64,
    /// Sum of per-bucket unique household counts
    pub total_households: u64,
    /// `[male, female]` slices for the gender chart
    pub gender_ratio: [u64; 2],
}

/// Label -> count map for a categorical breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub counts: BTreeMap<String, u64>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Descending count, then label
    pub fn sorted(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|(label, count)| (label.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

/// Categorical breakdowns rendered next to the age buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributions {
    pub by_gender: Distribution,
    pub by_disability_type: Distribution,
    pub by_death_status: Distribution,
    pub by_township: Distribution,
    pub by_village: Distribution,
}

/// One charted metric across the report's bucket rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub metric: BucketMetric,
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Everything one dashboard page renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicReport {
    pub title: String,
    /// Calendar date ages were computed against, in the caller's local time
    pub as_of: NaiveDate,
    /// Bucket rows in the view's display order
    pub buckets: BucketedStats,
    pub summary: DemographicSummary,
    pub distributions: Distributions,
    pub charts: Vec<ChartSeries>,
    pub facet_options: FacetOptions,
    /// Records returned by the source
    pub fetched_records: u64,
    /// Records passing the filter
    pub matched_records: u64,
    /// Matched records excluded for a missing, unparsable or future birth date
    pub skipped_records: u64,
    /// Matched records whose age fell in no bucket
    pub unbucketed_records: u64,
    /// Distinct households across all matched records
    pub distinct_households: u64,
}
