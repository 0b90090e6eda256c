use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{or_fallback, parse_count, push_unique, ALL_ROUNDS, COUNT};

pub const WEEKEND_ROUNDS: &str = "weekend_rounds";
pub const WEEKDAY_ROUNDS: &str = "weekday_rounds";
pub const SECOND_HALF: &str = "second_half";
pub const BYE_ADJACENT_ROUNDS: &str = "bye_adjacent_rounds";

/// Rounds immediately before and after a team's bye.
pub(crate) const BYE_ADJACENT: &str = r"(?i)\b(either\s+side\s+of\s+(\w+\s+)?byes?|(before|after|around)\s+(their|the|a|its)\s+byes?)\b";

static WEEKEND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(weekends?|sat(urday)?s?|sun(day)?s?)\b").expect("Invalid regex")
});
static WEEKDAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(weekdays?|mon(day)?s?|tues?(day)?s?|wed(nesday)?s?|thu(r(s(day)?)?)?s?|fri(day)?s?)\b",
    )
    .expect("Invalid regex")
});
static FINAL_K_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(final|last)\s+{COUNT}\s+(dates?|weeks?|rounds?|weekends?)\b"
    ))
    .expect("Invalid regex")
});
static SECOND_HALF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(second|latter|back)\s+half\b").expect("Invalid regex")
});
static BYE_ADJACENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BYE_ADJACENT).expect("Invalid regex"));

/// Tag for the final `k` dates of the season.
#[must_use]
pub fn final_rounds_tag(k: u32) -> String {
    format!("final_{k}_rounds")
}

/// Extract round categories.
///
/// Every matching cue is kept, in a fixed order: weekend, weekday, final-K,
/// second half, bye-adjacent. Returns `["all_rounds"]` when nothing matches.
#[must_use]
pub fn extract_rounds(text: &str) -> Vec<String> {
    let mut rounds = Vec::new();

    if WEEKEND_PATTERN.is_match(text) {
        push_unique(&mut rounds, WEEKEND_ROUNDS);
    }
    if WEEKDAY_PATTERN.is_match(text) {
        push_unique(&mut rounds, WEEKDAY_ROUNDS);
    }
    for caps in FINAL_K_PATTERN.captures_iter(text) {
        if let Some(k) = caps.get(2).and_then(|m| parse_count(m.as_str())) {
            push_unique(&mut rounds, final_rounds_tag(k));
        }
    }
    if SECOND_HALF_PATTERN.is_match(text) {
        push_unique(&mut rounds, SECOND_HALF);
    }
    if BYE_ADJACENT_PATTERN.is_match(text) {
        push_unique(&mut rounds, BYE_ADJACENT_ROUNDS);
    }

    or_fallback(rounds, ALL_ROUNDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cues_yields_all_rounds() {
        assert_eq!(extract_rounds("Ensure at least 2 rivalry games"), vec![ALL_ROUNDS]);
        assert_eq!(extract_rounds(""), vec![ALL_ROUNDS]);
    }

    #[test]
    fn test_weekend_and_weekday_words() {
        assert_eq!(extract_rounds("played on Saturdays"), vec![WEEKEND_ROUNDS]);
        assert_eq!(extract_rounds("no Thursday night games"), vec![WEEKDAY_ROUNDS]);
        assert_eq!(extract_rounds("weekend rounds"), vec![WEEKEND_ROUNDS]);
    }

    #[test]
    fn test_day_abbreviations_need_word_boundaries() {
        // "satisfies", "month" and "friend" are not day names
        assert_eq!(extract_rounds("satisfies the month for a friend"), vec![ALL_ROUNDS]);
    }

    #[test]
    fn test_multiple_cues_are_retained() {
        let rounds = extract_rounds("on weekends in the final two dates of the season");
        assert_eq!(rounds, vec![WEEKEND_ROUNDS.to_string(), final_rounds_tag(2)]);
    }

    #[test]
    fn test_final_k_digits() {
        assert_eq!(extract_rounds("within the last 3 weeks"), vec![final_rounds_tag(3)]);
    }

    #[test]
    fn test_second_half() {
        assert_eq!(
            extract_rounds("back-to-back weeks in the second half of the season"),
            vec![SECOND_HALF]
        );
    }

    #[test]
    fn test_bye_adjacent() {
        for text in [
            "home games on either side of their bye",
            "no road game before their bye",
            "a home game after the bye",
        ] {
            assert_eq!(extract_rounds(text), vec![BYE_ADJACENT_ROUNDS], "{text:?}");
        }
    }

    #[test]
    fn test_bye_week_alone_is_not_adjacency() {
        assert_eq!(extract_rounds("at least 1 bye week"), vec![ALL_ROUNDS]);
    }
}
