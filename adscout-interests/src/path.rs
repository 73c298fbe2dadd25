//! Turn category paths into display strings.

use crate::domain::PathValue;

/// The separator placed between breadcrumb segments.
pub const PATH_SEPARATOR: &str = " > ";

/// Join a path into a single display string.
///
/// Strings are returned unchanged, so normalizing an already normalized path
/// is a no-op. Breadcrumbs keep their string segments, in order, joined by
/// [`PATH_SEPARATOR`]. Anything else becomes an empty string.
pub fn normalize_path(path: &PathValue) -> String {
    match path {
        PathValue::Single(path) => path.clone(),
        PathValue::Breadcrumb(segments) => segments
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR),
        PathValue::Unusable(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_are_unchanged() {
        assert_eq!(normalize_path(&PathValue::from("Interests")), "Interests");
        assert_eq!(normalize_path(&PathValue::from("")), "");
        assert_eq!(
            normalize_path(&PathValue::from("  Interests >  Games ")),
            "  Interests >  Games "
        );
    }

    #[test]
    fn breadcrumb_segments_are_not_trimmed() {
        let path = PathValue::from([" Interests", "", "Games "]);
        assert_eq!(normalize_path(&path), " Interests >  > Games ");
    }

    #[test]
    fn breadcrumbs_are_joined_in_order() {
        let path = PathValue::from(["Interests", "Games", "Action games"]);
        assert_eq!(normalize_path(&path), "Interests > Games > Action games");
    }

    #[test]
    fn non_string_segments_are_dropped() {
        let path = PathValue::Breadcrumb(vec![
            json!("Interests"),
            json!(12),
            json!(null),
            json!({"name": "Games"}),
            json!("Games"),
        ]);
        assert_eq!(normalize_path(&path), "Interests > Games");
    }

    #[test]
    fn unusable_paths_are_empty() {
        assert_eq!(normalize_path(&PathValue::default()), "");
        assert_eq!(normalize_path(&PathValue::Unusable(json!(42))), "");
        assert_eq!(normalize_path(&PathValue::Breadcrumb(vec![])), "");
    }

    #[test]
    fn normalizing_is_idempotent() {
        let once = normalize_path(&PathValue::from(["Interests", "Technology"]));
        let twice = normalize_path(&PathValue::Single(once.clone()));
        assert_eq!(once, twice);
    }
}
