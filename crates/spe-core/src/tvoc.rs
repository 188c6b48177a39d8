//! Temporal Violation of Context (TVOC) detection.
//!
//! A strong TVOC is a forensic signal that an output references a year
//! strictly beyond the declared boundary while the attested context carried
//! no post-boundary information: the generator produced temporal
//! information it could not have been given.
//!
//! The detector is purely functional. It never consults the ledger and has
//! no side effects.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Explicit 4-digit year mentions, 1900–2099, at word boundaries.
static YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("year regex is valid"));

/// Detection verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TvocVerdict {
    /// The output references post-boundary years with no post-boundary
    /// context to explain them.
    Strong,
    /// No violation.
    None,
}

impl TvocVerdict {
    /// The string rendered in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "STRONG",
            Self::None => "NONE",
        }
    }
}

/// Result of a TVOC scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TvocReport {
    /// The verdict.
    pub verdict: TvocVerdict,

    /// Years found in the output that exceed the boundary; empty unless the
    /// verdict is [`TvocVerdict::Strong`].
    pub violating_years: Vec<i64>,

    /// The declared boundary, echoed for reference.
    pub t_target: i64,
}

/// Extracts explicit year mentions from text, in order of appearance.
///
/// Duplicates are preserved.
#[must_use]
pub fn extract_years(text: &str) -> Vec<i64> {
    YEAR_REGEX
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Scans output text for a strong temporal violation.
///
/// The verdict is `STRONG` iff some extracted year strictly exceeds
/// `t_target` *and* the context carried nothing past the boundary
/// (`context_has_post_target` is false). Everything else is `NONE`.
#[must_use]
pub fn detect_strong(output_text: &str, t_target: i64, context_has_post_target: bool) -> TvocReport {
    let violating: Vec<i64> = extract_years(output_text)
        .into_iter()
        .filter(|&year| year > t_target)
        .collect();

    if !violating.is_empty() && !context_has_post_target {
        TvocReport {
            verdict: TvocVerdict::Strong,
            violating_years: violating,
            t_target,
        }
    } else {
        TvocReport {
            verdict: TvocVerdict::None,
            violating_years: Vec::new(),
            t_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_only_bounded_four_digit_years() {
        let years = extract_years("In 1999 and again in 2027, but not 18950, 2150, or 1899.");
        assert_eq!(years, vec![1999, 2027]);
    }

    #[test]
    fn embedded_digits_do_not_match() {
        assert!(extract_years("build-20271 x2027y 12027").is_empty());
        assert_eq!(extract_years("(2027)"), vec![2027]);
    }

    #[test]
    fn duplicates_are_preserved() {
        assert_eq!(extract_years("2027, 2027"), vec![2027, 2027]);
    }

    #[test]
    fn strong_when_future_year_and_no_post_target_context() {
        let report = detect_strong(
            "In 2027, the European AI Act enforcement expanded...",
            2025,
            false,
        );
        assert_eq!(report.verdict, TvocVerdict::Strong);
        assert_eq!(report.violating_years, vec![2027]);
        assert_eq!(report.t_target, 2025);
    }

    #[test]
    fn none_when_context_explains_the_future_year() {
        let report = detect_strong("In 2027, enforcement expanded...", 2025, true);
        assert_eq!(report.verdict, TvocVerdict::None);
        assert!(report.violating_years.is_empty());
    }

    #[test]
    fn none_when_all_years_within_boundary() {
        let report = detect_strong("Back in 2019 and 2024.", 2025, false);
        assert_eq!(report.verdict, TvocVerdict::None);
        assert!(report.violating_years.is_empty());
    }

    #[test]
    fn boundary_year_itself_does_not_violate() {
        let report = detect_strong("During 2025.", 2025, false);
        assert_eq!(report.verdict, TvocVerdict::None);
    }
}
