use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Date layouts the backend has been seen to deliver, tried in order
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Why a record has no usable age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthDateIssue {
    Missing,
    Unparsable,
    InFuture,
}

/// Parse a raw birth date string. Returns `None` for anything unrecognised.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Completed years between `birth` and `today`, or `None` if `birth` is later
/// than `today`. A 29 February birthday is reached on 1 March in common years.
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Age of a record's raw birth date as of `today`
pub fn age_from_raw(raw: Option<&str>, today: NaiveDate) -> Result<u32, BirthDateIssue> {
    let raw = raw.filter(|r| !r.trim().is_empty()).ok_or(BirthDateIssue::Missing)?;
    let birth = parse_birth_date(raw).ok_or(BirthDateIssue::Unparsable)?;
    age_in_years(birth, today).ok_or(BirthDateIssue::InFuture)
}
