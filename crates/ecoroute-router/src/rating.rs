// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rating extraction from free-form model output.
//!
//! Judge models are asked for a bare number but often answer with prose
//! ("I'd rate this a 7", "Score: 8/10"). The extractor tries an ordered
//! pattern table; the first pattern with any match wins, and within it the
//! first match in reading order. Digits are never split out of a longer
//! number, so "100" yields nothing.

use std::sync::LazyLock;

use ecoroute_core::ComplexityScore;
use regex::Regex;

/// Ordered extraction patterns. Capture group 1 is the rating.
static RATING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Standalone 1-10.
        Regex::new(r"\b(10|[1-9])\b").unwrap(),
        // N/10
        Regex::new(r"(?:^|[^0-9])(10|[1-9])/10(?:[^0-9]|$)").unwrap(),
        // rating: N
        Regex::new(r"(?i)rating:?\s*(10|[1-9])(?:[^0-9]|$)").unwrap(),
        // score: N
        Regex::new(r"(?i)score:?\s*(10|[1-9])(?:[^0-9]|$)").unwrap(),
        // complexity: N
        Regex::new(r"(?i)complexity:?\s*(10|[1-9])(?:[^0-9]|$)").unwrap(),
    ]
});

/// Extract a rating in `1..=10`, or `Unknown` if the text holds none.
pub fn extract_rating(text: &str) -> ComplexityScore {
    for pattern in RATING_PATTERNS.iter() {
        let Some(captures) = pattern.captures(text) else {
            continue;
        };
        if let Some(value) = captures.get(1).and_then(|m| m.as_str().parse::<i64>().ok()) {
            return ComplexityScore::from_raw(value.clamp(1, 10));
        }
    }
    ComplexityScore::Unknown
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn score(text: &str) -> ComplexityScore {
        extract_rating(text)
    }

    #[test]
    fn fraction_form() {
        assert_eq!(score("7/10"), ComplexityScore::Score(7));
        assert_eq!(score("I give it 10/10"), ComplexityScore::Score(10));
    }

    #[test]
    fn rating_in_prose() {
        assert_eq!(score("I'd rate this a 10"), ComplexityScore::Score(10));
        assert_eq!(score("Rating: 3 out of 10"), ComplexityScore::Score(3));
        assert_eq!(score("Score: 8"), ComplexityScore::Score(8));
        assert_eq!(score("complexity:4"), ComplexityScore::Score(4));
    }

    #[test]
    fn bare_number() {
        assert_eq!(score("5"), ComplexityScore::Score(5));
        assert_eq!(score("  9\n"), ComplexityScore::Score(9));
    }

    #[test]
    fn first_occurrence_wins() {
        assert_eq!(score("between 3 and 6"), ComplexityScore::Score(3));
    }

    #[test]
    fn no_numbers() {
        assert_eq!(score("no numbers here"), ComplexityScore::Unknown);
        assert_eq!(score(""), ComplexityScore::Unknown);
    }

    #[test]
    fn longer_numbers_are_not_split() {
        assert_eq!(score("100"), ComplexityScore::Unknown);
        assert_eq!(score("2024"), ComplexityScore::Unknown);
        assert_eq!(score("0"), ComplexityScore::Unknown);
        assert_eq!(score("100/10"), ComplexityScore::Unknown);
    }

    #[test]
    fn later_patterns_apply_when_earlier_ones_miss() {
        // Glued to letters, so the standalone pattern has no word boundary.
        assert_eq!(score("score:7x"), ComplexityScore::Score(7));
        assert_eq!(score("rating8"), ComplexityScore::Score(8));
    }

    proptest! {
        #[test]
        fn result_is_always_in_range(text in ".{0,64}") {
            match extract_rating(&text) {
                ComplexityScore::Score(v) => prop_assert!((1..=10).contains(&v)),
                ComplexityScore::Unknown => {}
            }
        }

        #[test]
        fn bare_rating_roundtrips(n in 1u8..=10) {
            prop_assert_eq!(extract_rating(&n.to_string()), ComplexityScore::Score(n));
        }
    }
}
