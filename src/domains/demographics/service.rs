use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use std::sync::Arc;

use super::bucketing::bucketize_with;
use super::distribution::distributions;
use super::summary::{chart_series, distinct_households, summarize};
use super::tracker::ReportRequestTracker;
use super::types::DemographicReport;
use super::views::ReportView;
use crate::auth::AuthContext;
use crate::domains::permission::STAFF;
use crate::domains::person::{
    filter, FacetLookupSource, FacetOptions, FilterCriteria, PersonRecord, PersonRecordSource,
};
use crate::errors::{DomainResult, ServiceResult};
use crate::types::{PaginatedResult, PaginationParams};
use crate::validation::Validate;

/// Builds the dashboard reports
#[async_trait]
pub trait DemographicReportService: Send + Sync {
    /// Fetch, filter and aggregate one report
    async fn build_report(
        &self,
        view: &ReportView,
        criteria: &FilterCriteria,
        as_of: NaiveDate,
        auth: &AuthContext,
    ) -> ServiceResult<DemographicReport>;

    /// Like [`build_report`](Self::build_report), but returns `Ok(None)` when a
    /// newer request or a criteria change on the same view overtook this one
    /// while it ran
    async fn build_tracked_report(
        &self,
        view: &ReportView,
        criteria: &FilterCriteria,
        as_of: NaiveDate,
        auth: &AuthContext,
    ) -> ServiceResult<Option<DemographicReport>>;

    /// One page of the filtered records for the tabular breakdown
    async fn list_records(
        &self,
        view: &ReportView,
        criteria: &FilterCriteria,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<PersonRecord>>;

    /// Distinct values for the filter UI
    async fn load_facets(&self, auth: &AuthContext) -> ServiceResult<FacetOptions>;

    /// Tracker shared by tracked report builds
    fn tracker(&self) -> &ReportRequestTracker;
}

/// Implementation of the report service
pub struct DemographicReportServiceImpl {
    record_source: Arc<dyn PersonRecordSource>,
    facet_source: Arc<dyn FacetLookupSource>,
    tracker: ReportRequestTracker,
}

impl DemographicReportServiceImpl {
    pub fn new(
        record_source: Arc<dyn PersonRecordSource>,
        facet_source: Arc<dyn FacetLookupSource>,
    ) -> Self {
        Self {
            record_source,
            facet_source,
            tracker: ReportRequestTracker::new(),
        }
    }
}

/// Aggregate already fetched records into a report
pub fn assemble_report(
    view: &ReportView,
    criteria: &FilterCriteria,
    records: &[PersonRecord],
    facet_options: FacetOptions,
    as_of: NaiveDate,
) -> DomainResult<DemographicReport> {
    let matched = filter(records, criteria);
    let outcome = bucketize_with(
        matched.iter().copied(),
        &view.buckets,
        as_of,
        &view.bucketing_options(),
    )?;

    let summary = summarize(&outcome.stats, view.gender_ratio);
    let buckets = outcome.stats.sorted(view.bucket_order);
    let charts = chart_series(&buckets, &view.metrics);

    if outcome.malformed > 0 {
        debug!(
            "{}: {} of {} matched records have no usable birth date",
            view.title,
            outcome.malformed,
            matched.len()
        );
    }

    Ok(DemographicReport {
        title: view.title.clone(),
        as_of,
        buckets,
        summary,
        distributions: distributions(matched.iter().copied()),
        charts,
        facet_options,
        fetched_records: records.len() as u64,
        matched_records: matched.len() as u64,
        skipped_records: outcome.malformed,
        unbucketed_records: outcome.unbucketed,
        distinct_households: distinct_households(matched.iter().copied()),
    })
}

#[async_trait]
impl DemographicReportService for DemographicReportServiceImpl {
    async fn build_report(
        &self,
        view: &ReportView,
        criteria: &FilterCriteria,
        as_of: NaiveDate,
        auth: &AuthContext,
    ) -> ServiceResult<DemographicReport> {
        auth.authorize(&view.required_roles)?;
        criteria.validate()?;

        // Both lookups must land before aggregation starts
        let (records, facet_options) = tokio::try_join!(
            self.record_source.fetch_records(view.inclusion),
            self.facet_source.facet_options(),
        )?;

        let report = assemble_report(view, criteria, &records, facet_options, as_of)?;
        info!(
            "Built '{}' report: {} of {} records matched, {} skipped",
            report.title, report.matched_records, report.fetched_records, report.skipped_records
        );
        Ok(report)
    }

    async fn build_tracked_report(
        &self,
        view: &ReportView,
        criteria: &FilterCriteria,
        as_of: NaiveDate,
        auth: &AuthContext,
    ) -> ServiceResult<Option<DemographicReport>> {
        // Denied or invalid requests never supersede one already in flight
        auth.authorize(&view.required_roles)?;
        criteria.validate()?;

        let tag = self.tracker.begin(&view.title, criteria);
        let report = self.build_report(view, criteria, as_of, auth).await?;
        Ok(self.tracker.accept(&tag, report))
    }

    async fn list_records(
        &self,
        view: &ReportView,
        criteria: &FilterCriteria,
        params: PaginationParams,
        auth: &AuthContext,
    ) -> ServiceResult<PaginatedResult<PersonRecord>> {
        auth.authorize(&view.required_roles)?;
        criteria.validate()?;
        params.validate()?;

        let records = self.record_source.fetch_records(view.inclusion).await?;
        let matched: Vec<PersonRecord> = filter(&records, criteria).into_iter().cloned().collect();
        Ok(PaginatedResult::from_slice(&matched, params))
    }

    async fn load_facets(&self, auth: &AuthContext) -> ServiceResult<FacetOptions> {
        auth.authorize(&STAFF)?;
        Ok(self.facet_source.facet_options().await?)
    }

    fn tracker(&self) -> &ReportRequestTracker {
        &self.tracker
    }
}
