//! Separate interest categories from behaviors and demographics.
//!
//! The upstream search returns all three taxonomy families from one endpoint.
//! Only interests can be targeted by callers, so everything else is dropped.

use crate::{domain::InterestRecord, path::normalize_path};

/// Lowercase path prefixes of the taxonomy families that are not interests.
const EXCLUDED_FAMILIES: [&str; 3] = ["behavior", "behaviour", "demographic"];

/// Keep the records that are interest categories, in their original order.
///
/// A record is an interest if its normalized path is non-empty and doesn't
/// start with one of the excluded families, ignoring case.
pub fn classify(records: &[InterestRecord]) -> Vec<&InterestRecord> {
    records
        .iter()
        .filter(|record| is_interest_path(&normalize_path(&record.path)))
        .collect()
}

/// Whether a normalized path belongs to the interest family.
fn is_interest_path(path: &str) -> bool {
    let path = path.to_lowercase();
    !path.is_empty()
        && !EXCLUDED_FAMILIES
            .iter()
            .any(|family| path.starts_with(family))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PathValue;
    use pretty_assertions::assert_eq;

    fn record(id: &str, path: PathValue) -> InterestRecord {
        InterestRecord {
            id: id.to_string(),
            name: format!("record {}", id),
            path,
            ..InterestRecord::default()
        }
    }

    #[test]
    fn behaviors_and_demographics_are_dropped() {
        let records = vec![
            record("1", PathValue::from(["Behaviors", "Digital activities"])),
            record("2", PathValue::from(["Interests", "Games"])),
            record("3", PathValue::from(["Demographics", "Education"])),
            record("4", PathValue::from("behaviour > Travel")),
            record("5", PathValue::from("DEMOGRAPHIC")),
        ];

        let ids: Vec<_> = classify(&records).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn order_is_preserved() {
        let records = vec![
            record("a", PathValue::from(["Interests", "Technology"])),
            record("b", PathValue::from(["Behaviors", "Mobile"])),
            record("c", PathValue::from(["Interests", "Games", "MOBA"])),
            record("d", PathValue::from(["Shopping and fashion"])),
        ];

        let ids: Vec<_> = classify(&records).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn records_without_a_path_are_dropped() {
        let records = vec![
            record("1", PathValue::default()),
            record("2", PathValue::from("")),
            record("3", PathValue::Breadcrumb(vec![serde_json::json!(1)])),
        ];

        assert!(classify(&records).is_empty());
    }

    #[test]
    fn only_the_prefix_matters() {
        let records = vec![record("1", PathValue::from(["Interests", "Behavioral science"]))];
        assert_eq!(classify(&records).len(), 1);
    }
}
