//! Shared primitive types used across the metrics pipeline.

/// A cleaned level number, extracted from a free-form level label.
pub type Level = u64;

/// A cleaned ad-sequence number, extracted from an ad-event label.
pub type AdStep = u64;

/// A user count as reported by the analytics export.
pub type UserCount = u64;

/// A percentage already rounded to two decimals.
pub type Percent = f64;

/// Which input table a row or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Retention,
    AdEvents,
}

impl TableKind {
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Retention => "retention",
            TableKind::AdEvents  => "ad event",
        }
    }
}

/// Round to two decimals, ties to even. Negative zero is normalized to zero
/// so it never renders as "-0.0".
pub fn round2(value: f64) -> Percent {
    let rounded = (value * 100.0).round_ties_even() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Render a float the way the dashboard always has: at least one decimal
/// place, otherwise the shortest round-trip representation.
pub fn format_float(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Render a rounded percentage with its `%` suffix.
pub fn format_percent(value: Percent) -> String {
    format!("{}%", format_float(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_keep_one_decimal() {
        assert_eq!(format_float(50.0), "50.0");
        assert_eq!(format_float(27.27), "27.27");
        assert_eq!(format_float(-10.0), "-10.0");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn rounding_never_yields_negative_zero() {
        assert_eq!(format_float(round2(-0.001)), "0.0");
        assert_eq!(round2(17.272727), 17.27);
        assert_eq!(round2(72.727272), 72.73);
    }

    #[test]
    fn halfway_values_round_to_even() {
        assert_eq!(round2(12.125), 12.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }
}
