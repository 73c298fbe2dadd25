//! Fallback keywords for queries with no usable interests.
//!
//! This is a fixed heuristic, not a search. The same query and paths always
//! produce the same suggestions.

use std::collections::HashSet;

use crate::{domain::PathValue, domain::SuggestionSet, path::normalize_path};

/// The most suggestions ever returned.
const MAX_SUGGESTIONS: usize = 4;

/// A taxonomy family and the keywords to suggest for it.
struct FamilyRule {
    /// Second breadcrumb segment, lowercase, that selects this rule.
    family: &'static str,
    /// Substring of the lowercase query that also selects this rule.
    query_stem: &'static str,
    /// Keywords added when the rule matches.
    suggestions: &'static [&'static str],
}

/// At most one of these applies: the first that matches, in this order.
static FAMILY_RULES: [FamilyRule; 3] = [
    FamilyRule {
        family: "games",
        query_stem: "game",
        suggestions: &["video games", "online games", "gamers", "esports"],
    },
    FamilyRule {
        family: "entertainment",
        query_stem: "anime",
        suggestions: &["anime", "manga", "cosplay", "japanese animation"],
    },
    FamilyRule {
        family: "technology",
        query_stem: "tech",
        suggestions: &["technology", "consumer electronics", "computers", "gadgets"],
    },
];

/// Every stem found in the lowercase query contributes its whole group, in
/// this order.
static KEYWORD_STEMS: [(&str, &[&str]); 6] = [
    ("pc", &["PC games", "gaming PC"]),
    ("mobile", &["mobile games", "smartphones"]),
    ("rpg", &["role-playing games", "MMORPG"]),
    (
        "moba",
        &["multiplayer online battle arena", "League of Legends", "Dota 2"],
    ),
    ("esports", &["esports", "competitive gaming"]),
    ("game", &["video games", "gamers"]),
];

/// Used when no rule or stem matches.
const DEFAULT_SUGGESTIONS: [&str; MAX_SUGGESTIONS] =
    ["video games", "gamers", "online games", "videojuegos"];

/// Suggest up to four keywords to search for instead of `query`.
///
/// `raw_paths` are the paths of every upstream result, including the ones
/// classification rejected. Their second breadcrumb segment hints at which
/// taxonomy family the query was close to.
pub fn suggest<'a, I>(query: &str, raw_paths: I) -> SuggestionSet
where
    I: IntoIterator<Item = &'a PathValue>,
{
    let query = query.to_lowercase();
    let hints = family_hints(raw_paths);

    let family_group: &[&str] = FAMILY_RULES
        .iter()
        .find(|rule| hints.contains(rule.family) || query.contains(rule.query_stem))
        .map(|rule| rule.suggestions)
        .unwrap_or_default();

    let stem_groups = KEYWORD_STEMS
        .iter()
        .filter(|(stem, _)| query.contains(stem))
        .flat_map(|(_, group)| group.iter());

    let mut seen = HashSet::new();
    let merged: Vec<String> = family_group
        .iter()
        .chain(stem_groups)
        .copied()
        .filter(|suggestion| seen.insert(*suggestion))
        .take(MAX_SUGGESTIONS)
        .map(ToOwned::to_owned)
        .collect();

    if merged.is_empty() {
        SuggestionSet(DEFAULT_SUGGESTIONS.iter().map(|s| (*s).to_owned()).collect())
    } else {
        SuggestionSet(merged)
    }
}

/// The lowercase second segment of every path that has one.
fn family_hints<'a, I>(raw_paths: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a PathValue>,
{
    raw_paths
        .into_iter()
        .filter_map(|path| {
            normalize_path(path)
                .split('>')
                .nth(1)
                .map(|segment| segment.trim().to_lowercase())
        })
        .collect()
}
