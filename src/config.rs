use log::debug;
use serde::{Deserialize, Serialize};
use std::env;

use crate::domains::demographics::{BucketOrder, GenderRatioMode, GenderTokens, UnbucketedPolicy};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::types::PaginationParams;
use crate::validation::{common, Validate, ValidationBuilder};

pub const MALE_TOKEN_VAR: &str = "VIMS_MALE_TOKEN";
pub const FEMALE_TOKEN_VAR: &str = "VIMS_FEMALE_TOKEN";
pub const GENDER_RATIO_VAR: &str = "VIMS_GENDER_RATIO";
pub const BUCKET_ORDER_VAR: &str = "VIMS_BUCKET_ORDER";
pub const UNBUCKETED_POLICY_VAR: &str = "VIMS_UNBUCKETED_POLICY";
pub const PAGE_SIZE_VAR: &str = "VIMS_PAGE_SIZE";

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Deployment-level report settings layered over the per-view presets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub gender_tokens: GenderTokens,
    pub gender_ratio: GenderRatioMode,
    /// Overrides every view's bucket order when set
    pub bucket_order: Option<BucketOrder>,
    pub unbucketed: UnbucketedPolicy,
    pub page_size: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            gender_tokens: GenderTokens::default(),
            gender_ratio: GenderRatioMode::default(),
            bucket_order: None,
            unbucketed: UnbucketedPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ReportSettings {
    /// Load settings from the process environment, reading a `.env` file first
    /// if one is present
    pub fn from_env() -> DomainResult<Self> {
        if let Err(e) = dotenv::dotenv() {
            debug!("No .env file loaded: {}", e);
        }
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup. Unset or blank
    /// variables keep their defaults; unparsable values are rejected.
    pub fn from_vars<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(male) = get(MALE_TOKEN_VAR) {
            settings.gender_tokens.male = male;
        }
        if let Some(female) = get(FEMALE_TOKEN_VAR) {
            settings.gender_tokens.female = female;
        }
        if let Some(raw) = get(GENDER_RATIO_VAR) {
            settings.gender_ratio = GenderRatioMode::from_str(&raw)
                .ok_or_else(|| invalid(GENDER_RATIO_VAR, "must be explicit_counts or total_minus_female"))?;
        }
        if let Some(raw) = get(BUCKET_ORDER_VAR) {
            settings.bucket_order = Some(
                BucketOrder::from_str(&raw)
                    .ok_or_else(|| invalid(BUCKET_ORDER_VAR, "must be configured or member_count"))?,
            );
        }
        if let Some(raw) = get(UNBUCKETED_POLICY_VAR) {
            settings.unbucketed = UnbucketedPolicy::from_str(&raw)
                .ok_or_else(|| invalid(UNBUCKETED_POLICY_VAR, "must be drop or reject"))?;
        }
        if let Some(raw) = get(PAGE_SIZE_VAR) {
            settings.page_size = raw
                .parse::<u32>()
                .map_err(|_| ValidationError::format(PAGE_SIZE_VAR, "must be a positive integer"))?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Pagination for the tabular breakdown at the configured page size
    pub fn pagination(&self, page: u32) -> PaginationParams {
        PaginationParams::new(page, self.page_size)
    }
}

fn invalid(field: &str, reason: &str) -> DomainError {
    DomainError::Validation(ValidationError::invalid_value(field, reason))
}

impl Validate for ReportSettings {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("gender_tokens.male", Some(self.gender_tokens.male.clone()))
            .not_blank()
            .validate()?;
        ValidationBuilder::new("gender_tokens.female", Some(self.gender_tokens.female.clone()))
            .not_blank()
            .validate()?;
        if self.gender_tokens.male == self.gender_tokens.female {
            return Err(ValidationError::custom("Male and female gender tokens must differ").into());
        }
        common::validate_page_size(self.page_size)
    }
}
