use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::{parse_count, COUNT};

/// Numeric bounds on how often a constraint may hold.
///
/// `None` means the text gave no cue for that side. Template builders decide
/// what an unspecified side defaults to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl Bounds {
    /// Both sides unspecified.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Fill unspecified sides with the given defaults.
    ///
    /// A defaulted side never crosses a stated one: "at least 3" against a
    /// default max of 2 resolves to (3, 3).
    #[must_use]
    pub fn resolve(&self, default_min: u32, default_max: u32) -> (u32, u32) {
        match (self.min, self.max) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, default_max.max(min)),
            (None, Some(max)) => (default_min.min(max), max),
            (None, None) => (default_min, default_max),
        }
    }
}

static AT_LEAST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bat\s+least\s+{COUNT}\b")).expect("Invalid regex")
});
static AT_MOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bat\s+most\s+{COUNT}\b")).expect("Invalid regex")
});
static BETWEEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bbetween\s+{COUNT}\s+and\s+{COUNT}\b")).expect("Invalid regex")
});
static NEGATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(no\s+cases?|none|zero|don['’]?t\s+schedule|do\s+not\s+schedule)\b")
        .expect("Invalid regex")
});

fn capture_count(pattern: &Regex, text: &str, group: usize) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(group))
        .and_then(|m| parse_count(m.as_str()))
}

/// Extract `min`/`max` bounds.
///
/// - "at least N" sets `min`, "at most N" sets `max`
/// - "between N and M" sets both, but only when neither of the above matched
/// - negation ("no cases", "none", "zero", "do not schedule") forces both to
///   zero, overriding any numeric match
///
/// When both sides are present they are ordered so that `min <= max`.
#[must_use]
pub fn extract_bounds(text: &str) -> Bounds {
    if NEGATION_PATTERN.is_match(text) {
        return Bounds {
            min: Some(0),
            max: Some(0),
        };
    }

    let mut bounds = Bounds {
        min: capture_count(&AT_LEAST_PATTERN, text, 1),
        max: capture_count(&AT_MOST_PATTERN, text, 1),
    };

    if bounds.is_unspecified() {
        bounds.min = capture_count(&BETWEEN_PATTERN, text, 1);
        bounds.max = capture_count(&BETWEEN_PATTERN, text, 2);
    }

    if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
        if min > max {
            bounds = Bounds {
                min: Some(max),
                max: Some(min),
            };
        }
    }

    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_least_only_leaves_max_unspecified() {
        for n in [0, 1, 2, 7, 42] {
            let bounds = extract_bounds(&format!("Ensure at least {n} rivalry games"));
            assert_eq!(bounds.min, Some(n));
            assert_eq!(bounds.max, None);
        }
    }

    #[test]
    fn test_at_least_and_at_most() {
        let bounds = extract_bounds("at least 2 and at most 5 games");
        assert_eq!(bounds, Bounds { min: Some(2), max: Some(5) });
    }

    #[test]
    fn test_number_words() {
        let bounds = extract_bounds("At most two consecutive away games");
        assert_eq!(bounds, Bounds { min: None, max: Some(2) });
    }

    #[test]
    fn test_between() {
        let bounds = extract_bounds("Require between 1 and 3 back-to-back sequences");
        assert_eq!(bounds, Bounds { min: Some(1), max: Some(3) });
    }

    #[test]
    fn test_between_ignored_when_explicit_bound_present() {
        let bounds = extract_bounds("at least 2 games between 1 and 3 weeks apart");
        assert_eq!(bounds, Bounds { min: Some(2), max: None });
    }

    #[test]
    fn test_negation_overrides_numbers() {
        for text in [
            "Do not schedule at least 3 games on Mondays",
            "don't schedule rivalry games at most 4 times",
            "There should be zero games on weekdays, at least 2 otherwise",
            "none of the 5 matchups in round 3",
            "no cases where a team plays 3 away games",
        ] {
            assert_eq!(
                extract_bounds(text),
                Bounds { min: Some(0), max: Some(0) },
                "negation not applied to {text:?}"
            );
        }
    }

    #[test]
    fn test_unspecified_without_cues() {
        assert!(extract_bounds("rivalry games on weekends").is_unspecified());
    }

    #[test]
    fn test_inverted_bounds_are_ordered() {
        let bounds = extract_bounds("at least 5 and at most 2 games");
        assert_eq!(bounds, Bounds { min: Some(2), max: Some(5) });
    }

    #[test]
    fn test_resolve_applies_defaults_per_side() {
        let bounds = Bounds { min: Some(2), max: None };
        assert_eq!(bounds.resolve(1, 999), (2, 999));
        assert_eq!(Bounds::default().resolve(0, 2), (0, 2));
    }

    #[test]
    fn test_resolve_default_never_crosses_stated_side() {
        let at_least = Bounds { min: Some(3), max: None };
        assert_eq!(at_least.resolve(0, 2), (3, 3));

        let at_most = Bounds { min: None, max: Some(0) };
        assert_eq!(at_most.resolve(1, 999), (0, 0));
    }
}
