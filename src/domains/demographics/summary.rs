use std::collections::HashSet;

use super::types::{BucketMetric, BucketedStats, ChartSeries, DemographicSummary, GenderRatioMode};
use crate::domains::person::PersonRecord;

/// Population-wide totals across every bucket row
pub fn summarize(stats: &BucketedStats, mode: GenderRatioMode) -> DemographicSummary {
    let mut summary = DemographicSummary::default();
    for row in stats.iter() {
        summary.total_population += row.stats.member_count;
        summary.total_male += row.stats.male_count;
        summary.total_female += row.stats.female_count;
        summary.total_households += row.stats.unique_household_count;
    }

    summary.gender_ratio = match mode {
        GenderRatioMode::ExplicitCounts => [summary.total_male, summary.total_female],
        GenderRatioMode::TotalMinusFemale => [
            summary.total_population.saturating_sub(summary.total_female),
            summary.total_female,
        ],
    };
    summary
}

/// Households with at least one member in `records`. Unlike
/// [`DemographicSummary::total_households`] a household spanning several
/// buckets counts once.
pub fn distinct_households<'a, I>(records: I) -> u64
where
    I: IntoIterator<Item = &'a PersonRecord>,
{
    records
        .into_iter()
        .filter_map(|r| r.household_id())
        .collect::<HashSet<_>>()
        .len() as u64
}

/// One series per metric over the rows, in row order
pub fn chart_series(stats: &BucketedStats, metrics: &[BucketMetric]) -> Vec<ChartSeries> {
    let labels: Vec<String> = stats.iter().map(|r| r.label.clone()).collect();
    metrics
        .iter()
        .map(|metric| ChartSeries {
            metric: *metric,
            name: metric.label().to_string(),
            labels: labels.clone(),
            values: stats.iter().map(|r| metric.value(&r.stats)).collect(),
        })
        .collect()
}
