//! Age bucketing engine.
//!
//! Each record is placed in the bucket containing its age in completed years as
//! of the report date. Records without a usable birth date are left out of every
//! count and never fail the report.

use chrono::NaiveDate;
use log::debug;
use std::collections::HashSet;

use super::age::age_from_raw;
use super::types::{
    AgeBucketDefinition, BucketRow, BucketStats, BucketedStats, GenderTokens, UnbucketedPolicy,
};
use crate::domains::person::PersonRecord;
use crate::errors::{DomainError, DomainResult};
use crate::types::RowId;

/// Knobs for [`bucketize_with`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketingOptions {
    pub gender_tokens: GenderTokens,
    pub unbucketed: UnbucketedPolicy,
}

/// Bucketed statistics plus what was left out
#[derive(Debug, Clone, PartialEq)]
pub struct BucketingOutcome {
    pub stats: BucketedStats,
    /// Records with a missing, unparsable or future birth date
    pub malformed: u64,
    /// Records whose age matched no bucket (dropped)
    pub unbucketed: u64,
}

enum Placement {
    Counted,
    Malformed,
    Unbucketed(u32),
}

#[derive(Default)]
struct Accumulator<'a> {
    members: u64,
    male: u64,
    female: u64,
    age_sum: u64,
    households: HashSet<&'a RowId>,
}

struct Scan<'a, 'd> {
    definition: &'d AgeBucketDefinition,
    accumulators: Vec<Accumulator<'a>>,
}

impl<'a, 'd> Scan<'a, 'd> {
    fn new(definition: &'d AgeBucketDefinition) -> Self {
        Self {
            definition,
            accumulators: (0..definition.len()).map(|_| Accumulator::default()).collect(),
        }
    }

    fn place(&mut self, record: &'a PersonRecord, today: NaiveDate, tokens: &GenderTokens) -> Placement {
        let age = match age_from_raw(record.date_of_birth.as_deref(), today) {
            Ok(age) => age,
            Err(issue) => {
                debug!(
                    "Skipping record {}: birth date {:?} is {:?}",
                    record.id, record.date_of_birth, issue
                );
                return Placement::Malformed;
            }
        };

        let index = match self.definition.index_of(age) {
            Some(index) => index,
            None => return Placement::Unbucketed(age),
        };

        let acc = &mut self.accumulators[index];
        acc.members += 1;
        acc.age_sum += u64::from(age);
        if let Some(gender) = record.gender.as_deref() {
            if tokens.is_male(gender) {
                acc.male += 1;
            } else if tokens.is_female(gender) {
                acc.female += 1;
            }
        }
        if let Some(household) = record.household_id() {
            acc.households.insert(household);
        }
        Placement::Counted
    }

    fn finish(self) -> BucketedStats {
        let rows = self
            .definition
            .buckets()
            .iter()
            .zip(self.accumulators)
            .map(|(bucket, acc)| BucketRow {
                label: bucket.label.clone(),
                stats: BucketStats {
                    member_count: acc.members,
                    male_count: acc.male,
                    female_count: acc.female,
                    unique_household_count: acc.households.len() as u64,
                    average_age: if acc.members == 0 {
                        0.0
                    } else {
                        acc.age_sum as f64 / acc.members as f64
                    },
                },
            })
            .collect();
        BucketedStats { rows }
    }
}

/// Bucket records with the default gender tokens, dropping ages no bucket
/// contains. Rows come back in definition order, one per bucket, even when
/// empty.
pub fn bucketize<'a, I>(records: I, definition: &AgeBucketDefinition, today: NaiveDate) -> BucketedStats
where
    I: IntoIterator<Item = &'a PersonRecord>,
{
    let tokens = GenderTokens::default();
    let mut scan = Scan::new(definition);
    for record in records {
        scan.place(record, today, &tokens);
    }
    scan.finish()
}

/// Bucket records with explicit options.
///
/// Fails with [`DomainError::UnbucketedAge`] on the first age no bucket contains
/// when the policy is [`UnbucketedPolicy::Reject`].
pub fn bucketize_with<'a, I>(
    records: I,
    definition: &AgeBucketDefinition,
    today: NaiveDate,
    options: &BucketingOptions,
) -> DomainResult<BucketingOutcome>
where
    I: IntoIterator<Item = &'a PersonRecord>,
{
    let mut scan = Scan::new(definition);
    let mut malformed = 0;
    let mut unbucketed = 0;

    for record in records {
        match scan.place(record, today, &options.gender_tokens) {
            Placement::Counted => {}
            Placement::Malformed => malformed += 1,
            Placement::Unbucketed(age) => match options.unbucketed {
                UnbucketedPolicy::Drop => {
                    debug!("Dropping record {}: age {} matches no bucket", record.id, age);
                    unbucketed += 1;
                }
                UnbucketedPolicy::Reject => return Err(DomainError::UnbucketedAge { age }),
            },
        }
    }

    Ok(BucketingOutcome {
        stats: scan.finish(),
        malformed,
        unbucketed,
    })
}
