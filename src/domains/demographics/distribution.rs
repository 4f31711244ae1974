use super::types::Distributions;
use crate::domains::person::types::{parse_flag, UNSPECIFIED};
use crate::domains::person::PersonRecord;

fn label_or_unspecified(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(UNSPECIFIED)
}

fn flag_label(raw: Option<&str>) -> &'static str {
    match parse_flag(raw) {
        Some(true) => "Yes",
        Some(false) => "No",
        None => UNSPECIFIED,
    }
}

/// Categorical breakdowns over the given (already filtered) records.
///
/// Every record contributes to the gender, death status, township and village
/// maps; only disabled records contribute to the disability type map.
pub fn distributions<'a, I>(records: I) -> Distributions
where
    I: IntoIterator<Item = &'a PersonRecord>,
{
    let mut result = Distributions::default();
    for record in records {
        result.by_gender.add(label_or_unspecified(record.gender.as_deref()));
        result.by_death_status.add(flag_label(record.is_deceased.as_deref()));
        result
            .by_township
            .add(label_or_unspecified(record.location.township.as_deref()));
        result
            .by_village
            .add(label_or_unspecified(record.location.village.as_deref()));
        if record.disabled() {
            result
                .by_disability_type
                .add(label_or_unspecified(record.disability_type.as_deref()));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::person::Location;

    fn record(id: i64, gender: Option<&str>, disabled: &str, disability_type: Option<&str>) -> PersonRecord {
        let mut r = PersonRecord::new(id);
        r.gender = gender.map(str::to_string);
        r.is_disabled = Some(disabled.to_string());
        r.is_deceased = Some(if id == 4 { "Yes" } else { "No" }.to_string());
        r.disability_type = disability_type.map(str::to_string);
        r.location = Location {
            village: Some("Kyauk Taw".to_string()),
            township: if id % 2 == 0 { Some("Hpa-an".to_string()) } else { None },
            ..Location::default()
        };
        r
    }

    #[test]
    fn test_distributions() {
        let records = vec![
            record(1, Some("M"), "Yes", Some("Visual")),
            record(2, Some("F"), "Yes", None),
            record(3, None, "No", Some("Hearing")),
            record(4, Some("F"), "Yes", Some(" ")),
        ];
        let result = distributions(&records);

        assert_eq!(result.by_gender.get("F"), 2);
        assert_eq!(result.by_gender.get(UNSPECIFIED), 1);

        // Record 3 is not disabled, so its type is ignored
        assert_eq!(result.by_disability_type.total(), 3);
        assert_eq!(result.by_disability_type.get("Visual"), 1);
        assert_eq!(result.by_disability_type.get(UNSPECIFIED), 2);
        assert_eq!(result.by_disability_type.get("Hearing"), 0);

        assert_eq!(result.by_death_status.get("Yes"), 1);
        assert_eq!(result.by_death_status.get("No"), 3);
        assert_eq!(result.by_township.get("Hpa-an"), 2);
        assert_eq!(result.by_township.get(UNSPECIFIED), 2);
        assert_eq!(result.by_village.get("Kyauk Taw"), 4);
    }
}
