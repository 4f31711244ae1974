pub mod age;
pub mod bucketing;
pub mod distribution;
pub mod service;
pub mod summary;
pub mod tracker;
pub mod types;
pub mod views;

pub use bucketing::{bucketize, bucketize_with, BucketingOptions, BucketingOutcome};
pub use distribution::distributions;
pub use service::{assemble_report, DemographicReportService, DemographicReportServiceImpl};
pub use summary::{chart_series, distinct_households, summarize};
pub use tracker::{ReportRequestTracker, RequestTag};
pub use types::{
    AgeBucket, AgeBucketDefinition, BucketMetric, BucketOrder, BucketRow, BucketStats,
    BucketedStats, ChartSeries, DemographicReport, DemographicSummary, Distribution,
    Distributions, GenderRatioMode, GenderTokens, UnbucketedPolicy,
};
pub use views::{ReportView, DEFAULT_AGE_BUCKETS};
