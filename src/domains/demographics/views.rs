use once_cell::sync::Lazy;

use super::bucketing::BucketingOptions;
use super::types::{
    AgeBucketDefinition, BucketMetric, BucketOrder, GenderRatioMode, GenderTokens, UnbucketedPolicy,
};
use crate::config::ReportSettings;
use crate::domains::permission::{RoleSet, MANAGEMENT, STAFF};
use crate::domains::person::RecordInclusion;

/// Buckets shared by every dashboard unless a view overrides them
pub static DEFAULT_AGE_BUCKETS: Lazy<AgeBucketDefinition> = Lazy::new(AgeBucketDefinition::standard);

/// Configuration of one dashboard page: which records it reads, how it buckets
/// them and what it charts
#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub title: String,
    pub inclusion: RecordInclusion,
    pub buckets: AgeBucketDefinition,
    pub bucket_order: BucketOrder,
    pub gender_ratio: GenderRatioMode,
    pub unbucketed: UnbucketedPolicy,
    pub gender_tokens: GenderTokens,
    pub metrics: Vec<BucketMetric>,
    pub required_roles: RoleSet,
}

impl ReportView {
    fn preset(
        title: &str,
        inclusion: RecordInclusion,
        bucket_order: BucketOrder,
        metrics: &[BucketMetric],
        required_roles: &RoleSet,
    ) -> Self {
        Self {
            title: title.to_string(),
            inclusion,
            buckets: (*DEFAULT_AGE_BUCKETS).clone(),
            bucket_order,
            gender_ratio: GenderRatioMode::default(),
            unbucketed: UnbucketedPolicy::default(),
            gender_tokens: GenderTokens::default(),
            metrics: metrics.to_vec(),
            required_roles: required_roles.clone(),
        }
    }

    /// Population dashboard over living residents
    pub fn population() -> Self {
        Self::preset(
            "Population",
            RecordInclusion::Residents,
            BucketOrder::Configured,
            &BucketMetric::ALL,
            &STAFF,
        )
    }

    /// Death register report
    pub fn death() -> Self {
        Self::preset(
            "Deaths",
            RecordInclusion::Deceased,
            BucketOrder::MemberCountDesc,
            &[BucketMetric::Members, BucketMetric::Male, BucketMetric::Female],
            &MANAGEMENT,
        )
    }

    /// Disability register report
    pub fn disability() -> Self {
        Self::preset(
            "Disabilities",
            RecordInclusion::Disabled,
            BucketOrder::MemberCountDesc,
            &[BucketMetric::Members, BucketMetric::Households, BucketMetric::AverageAge],
            &MANAGEMENT,
        )
    }

    pub fn with_buckets(mut self, buckets: AgeBucketDefinition) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_bucket_order(mut self, order: BucketOrder) -> Self {
        self.bucket_order = order;
        self
    }

    pub fn with_gender_ratio(mut self, mode: GenderRatioMode) -> Self {
        self.gender_ratio = mode;
        self
    }

    pub fn with_unbucketed_policy(mut self, policy: UnbucketedPolicy) -> Self {
        self.unbucketed = policy;
        self
    }

    pub fn with_gender_tokens(mut self, tokens: GenderTokens) -> Self {
        self.gender_tokens = tokens;
        self
    }

    pub fn with_metrics(mut self, metrics: &[BucketMetric]) -> Self {
        self.metrics = metrics.to_vec();
        self
    }

    pub fn with_required_roles(mut self, roles: &RoleSet) -> Self {
        self.required_roles = roles.clone();
        self
    }

    /// Layer deployment settings over the preset. The bucket order is only
    /// replaced when the settings carry one.
    pub fn apply_settings(mut self, settings: &ReportSettings) -> Self {
        self.gender_tokens = settings.gender_tokens.clone();
        self.gender_ratio = settings.gender_ratio;
        self.unbucketed = settings.unbucketed;
        if let Some(order) = settings.bucket_order {
            self.bucket_order = order;
        }
        self
    }

    pub fn bucketing_options(&self) -> BucketingOptions {
        BucketingOptions {
            gender_tokens: self.gender_tokens.clone(),
            unbucketed: self.unbucketed,
        }
    }
}
