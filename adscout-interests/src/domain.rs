//! Datatypes that flow through the interest pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// One search result, as reported by the upstream API.
///
/// Parsing is lenient: upstream occasionally sends ids as numbers, and bounds
/// can be missing or null. Anything unusable ends up as an empty string or
/// `None` instead of failing the whole response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct InterestRecord {
    /// Upstream identifier of the category.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Display name of the category.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// The taxonomy breadcrumb leading to this category.
    #[serde(default)]
    pub path: PathValue,

    /// Lower estimate of the audience matching the category.
    #[serde(
        default,
        rename = "audience_size_lower_bound",
        deserialize_with = "lenient_number"
    )]
    pub audience_lower: Option<f64>,

    /// Upper estimate of the audience matching the category.
    #[serde(
        default,
        rename = "audience_size_upper_bound",
        deserialize_with = "lenient_number"
    )]
    pub audience_upper: Option<f64>,
}

/// A category path in any of the shapes the upstream API uses.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PathValue {
    /// An already joined path.
    Single(String),
    /// Breadcrumb segments, root first. Non-string segments are ignored.
    Breadcrumb(Vec<Value>),
    /// Anything else, including a missing path.
    Unusable(Value),
}

impl Default for PathValue {
    fn default() -> Self {
        Self::Unusable(Value::Null)
    }
}

impl From<&str> for PathValue {
    fn from(path: &str) -> Self {
        Self::Single(path.to_owned())
    }
}

impl<const N: usize> From<[&str; N]> for PathValue {
    fn from(segments: [&str; N]) -> Self {
        Self::Breadcrumb(
            segments
                .iter()
                .map(|segment| Value::String((*segment).to_owned()))
                .collect(),
        )
    }
}

/// Deserialize strings as-is, numbers as their decimal form, and anything else
/// as an empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Deserialize JSON numbers, treating anything else as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// A search result ready to be shown to a caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormattedInterest {
    /// Upstream identifier of the category.
    pub id: String,
    /// Display name of the category.
    pub name: String,
    /// The breadcrumb joined with `" > "`.
    pub path: String,
    /// The audience range, or a dash when there is no data.
    pub size: String,
}

/// Between one and four distinct keywords to try instead of a query that had
/// no usable results.
///
/// Only [`crate::suggestions::suggest`] builds these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SuggestionSet(pub(crate) Vec<String>);

impl SuggestionSet {
    /// The suggestions, best first.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The number of suggestions. Always between 1 and 4.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, provided for symmetry with [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The result of looking up interests for one query.
///
/// A response either carries formatted interests or, when none survived
/// classification, fallback suggestions. Never both.
#[derive(Clone, Debug, PartialEq)]
pub enum InterestResponse {
    /// At least one interest category matched.
    Found {
        /// The query as the caller sent it.
        query: String,
        /// The matching interests, in upstream order.
        items: Vec<FormattedInterest>,
    },
    /// Nothing usable matched.
    Fallback {
        /// The query as the caller sent it.
        query: String,
        /// Keywords to try instead.
        suggestions: SuggestionSet,
    },
}

impl InterestResponse {
    /// The query this response answers.
    pub fn query(&self) -> &str {
        match self {
            Self::Found { query, .. } | Self::Fallback { query, .. } => query,
        }
    }

    /// The number of formatted interests. Zero for a fallback.
    pub fn count(&self) -> usize {
        match self {
            Self::Found { items, .. } => items.len(),
            Self::Fallback { .. } => 0,
        }
    }
}

/// Flattens a response to the wire format the API has always used:
/// `{query, count, items}` plus `suggestions` for a fallback.
impl Serialize for InterestResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        #[allow(clippy::missing_docs_in_private_items)]
        struct Generated<'a> {
            query: &'a str,
            count: usize,
            items: &'a [FormattedInterest],
            #[serde(skip_serializing_if = "Option::is_none")]
            suggestions: Option<&'a SuggestionSet>,
        }

        let generated = match self {
            Self::Found { query, items } => Generated {
                query,
                count: items.len(),
                items,
                suggestions: None,
            },
            Self::Fallback { query, suggestions } => Generated {
                query,
                count: 0,
                items: &[],
                suggestions: Some(suggestions),
            },
        };

        generated.serialize(serializer)
    }
}

/// How many results to ask the upstream API for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimit(u32);

impl SearchLimit {
    /// Interpret the caller's `limit` parameter.
    ///
    /// Missing, unparsable, zero, and negative values use `default`. Values
    /// above `max` are clamped to it.
    pub fn from_param(raw: Option<&str>, default: u32, max: u32) -> Self {
        let max = max.max(1);
        let requested = raw
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or_else(|| i64::from(default));

        let clamped = requested.clamp(1, i64::from(max));
        Self(u32::try_from(clamped).unwrap_or(max))
    }

    /// The limit as a number.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn records_parse_leniently() {
        let record: InterestRecord = serde_json::from_value(json!({
            "id": 6003,
            "path": ["Interests", 7, "Games"],
            "audience_size_lower_bound": "lots",
            "audience_size_upper_bound": 2000,
        }))
        .expect("record should parse");

        assert_eq!(
            record,
            InterestRecord {
                id: "6003".to_string(),
                name: String::new(),
                path: PathValue::Breadcrumb(vec![json!("Interests"), json!(7), json!("Games")]),
                audience_lower: None,
                audience_upper: Some(2000.0),
            }
        );
    }

    #[test]
    fn path_shapes() {
        let parse = |value| serde_json::from_value::<PathValue>(value).expect("any value parses");
        assert_eq!(parse(json!("A > B")), PathValue::from("A > B"));
        assert_eq!(parse(json!(["A", "B"])), PathValue::from(["A", "B"]));
        assert_eq!(parse(json!(null)), PathValue::default());
        assert_eq!(parse(json!({"a": 1})), PathValue::Unusable(json!({"a": 1})));
    }

    #[test]
    fn found_response_serializes_without_suggestions() {
        let response = InterestResponse::Found {
            query: "dota".to_string(),
            items: vec![FormattedInterest {
                id: "1".to_string(),
                name: "Dota 2".to_string(),
                path: "Interests > Games > MOBA".to_string(),
                size: "1M–2M".to_string(),
            }],
        };

        assert_eq!(
            serde_json::to_value(&response).expect("serializable"),
            json!({
                "query": "dota",
                "count": 1,
                "items": [{
                    "id": "1",
                    "name": "Dota 2",
                    "path": "Interests > Games > MOBA",
                    "size": "1M–2M",
                }],
            })
        );
    }

    #[test]
    fn fallback_response_serializes_with_empty_items() {
        let response = InterestResponse::Fallback {
            query: "football".to_string(),
            suggestions: SuggestionSet(vec!["video games".to_string()]),
        };

        assert_eq!(response.count(), 0);
        assert_eq!(
            serde_json::to_value(&response).expect("serializable"),
            json!({
                "query": "football",
                "count": 0,
                "items": [],
                "suggestions": ["video games"],
            })
        );
    }

    #[test]
    fn limits_fall_back_to_the_default() {
        let limit = |raw| SearchLimit::from_param(raw, 10, 100).get();
        assert_eq!(limit(None), 10);
        assert_eq!(limit(Some("")), 10);
        assert_eq!(limit(Some("ten")), 10);
        assert_eq!(limit(Some("0")), 10);
        assert_eq!(limit(Some("-5")), 10);
        assert_eq!(limit(Some("25")), 25);
        assert_eq!(limit(Some(" 3 ")), 3);
    }

    #[test]
    fn limits_are_clamped_to_the_maximum() {
        assert_eq!(SearchLimit::from_param(Some("5000"), 10, 100).get(), 100);
        assert_eq!(SearchLimit::from_param(None, 500, 100).get(), 100);
    }
}
