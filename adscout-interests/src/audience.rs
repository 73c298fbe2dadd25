//! Compact, human readable audience ranges.

/// Shown when either bound is missing or unusable.
pub const NO_AUDIENCE_DATA: &str = "—";

/// Placed between the two formatted bounds.
const RANGE_SEPARATOR: &str = "–";

/// Format a lower and upper audience estimate as a range such as `"1K–5K"`.
///
/// If either bound is missing, zero, negative, or not a finite number, the
/// result is [`NO_AUDIENCE_DATA`]. Each bound is scaled on its own, so the two
/// sides can use different suffixes.
pub fn format_audience(lower: Option<f64>, upper: Option<f64>) -> String {
    match (usable_bound(lower), usable_bound(upper)) {
        (Some(lower), Some(upper)) => format!(
            "{}{}{}",
            format_bound(lower),
            RANGE_SEPARATOR,
            format_bound(upper)
        ),
        _ => NO_AUDIENCE_DATA.to_string(),
    }
}

/// Keep only bounds that can be displayed.
fn usable_bound(bound: Option<f64>) -> Option<f64> {
    bound.filter(|value| value.is_finite() && *value > 0.0)
}

/// Scale one bound to the largest matching magnitude.
fn format_bound(value: f64) -> String {
    if value >= 1e9 {
        // One decimal place. Formatting an `f64` drops a trailing `.0`.
        format!("{}B", (value / 1e8).round() / 10.0)
    } else if value >= 1e6 {
        format!("{}M", (value / 1e6).round())
    } else if value >= 1e3 {
        format!("{}K", (value / 1e3).round())
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_uses_a_dash() {
        assert_eq!(format_audience(Some(0.0), Some(0.0)), "—");
        assert_eq!(format_audience(None, Some(5000.0)), "—");
        assert_eq!(format_audience(Some(5000.0), None), "—");
        assert_eq!(format_audience(Some(f64::NAN), Some(5000.0)), "—");
        assert_eq!(format_audience(Some(1200.0), Some(0.0)), "—");
    }

    #[test]
    fn thousands() {
        assert_eq!(format_audience(Some(1200.0), Some(5000.0)), "1K–5K");
        assert_eq!(format_audience(Some(1500.0), Some(999_499.0)), "2K–999K");
    }

    #[test]
    fn millions() {
        assert_eq!(format_audience(Some(1_000_000.0), Some(2_000_000.0)), "1M–2M");
        assert_eq!(format_audience(Some(1_400_000.0), Some(1_600_000.0)), "1M–2M");
    }

    #[test]
    fn billions_keep_one_decimal() {
        assert_eq!(
            format_audience(Some(2_500_000_000.0), Some(3_000_000_000.0)),
            "2.5B–3B"
        );
        assert_eq!(
            format_audience(Some(1_040_000_000.0), Some(1_960_000_000.0)),
            "1B–2B"
        );
    }

    #[test]
    fn small_values_are_shown_as_is() {
        assert_eq!(format_audience(Some(12.0), Some(999.0)), "12–999");
    }

    #[test]
    fn bounds_are_scaled_independently() {
        assert_eq!(format_audience(Some(800.0), Some(1_200_000.0)), "800–1M");
    }
}
