//! Re-ranking of nearest-neighbour shortlists
//!
//! Embedding similarity alone confuses families that share vocabulary: "bye"
//! appears in both game-scheduling and sequence phrasings, "consecutive" in
//! both sequence and team-pattern ones. A [`Reranker`] adjusts each
//! candidate's distance using cues from the query text and re-sorts.
//!
//! [`LexicalReranker`] applies the [`NUDGES`] table:
//!
//! | Cue in query                               | Family          | Nudge |
//! |--------------------------------------------|-----------------|-------|
//! | sequence or bye-adjacency language         | Sequence        | +0.10 |
//! | sequence or bye-adjacency language         | GameScheduling  | -0.05 |
//! | team scope and home/away/bye/active        | TeamPattern     | +0.10 |
//! | team scope and home/away/bye/active        | Sequence        | -0.05 |
//! | none of the above, scheduling vocabulary   | GameScheduling  | +0.01 |
//!
//! A positive nudge pulls a candidate closer:
//! `adjusted = max(0, distance - nudge)`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::extract::BYE_ADJACENT;
use crate::store::Neighbor;
use crate::template::{TemplateFamily, GAME_KIND, SEQUENCE_WORDS, TEAM_SCOPE};

pub trait Reranker {
    /// Distance adjustment for a candidate of `family` given `query`.
    fn nudge(&self, query: &str, family: TemplateFamily) -> f32;

    /// Adjust every candidate's distance and sort ascending.
    ///
    /// Candidates with equal adjusted distance keep their input order.
    fn rerank(&self, query: &str, neighbors: Vec<Neighbor>) -> Vec<Neighbor> {
        apply_nudges(neighbors, |family| self.nudge(query, family))
    }
}

/// Subtract each candidate's nudge from its distance, floored at zero, and
/// stable-sort ascending.
pub fn apply_nudges<F>(mut neighbors: Vec<Neighbor>, nudge: F) -> Vec<Neighbor>
where
    F: Fn(TemplateFamily) -> f32,
{
    for neighbor in &mut neighbors {
        neighbor.distance = (neighbor.distance - nudge(neighbor.example.family)).max(0.0);
    }
    neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    neighbors
}

/// Leaves distances untouched.
pub struct NoReranker;

impl Reranker for NoReranker {
    fn nudge(&self, _query: &str, _family: TemplateFamily) -> f32 {
        0.0
    }
}

/// Query-level lexical cues that drive nudges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Back-to-back / consecutive / sequence wording, or bye adjacency
    SequenceLanguage,
    /// "each team", "no team", ... together with a home/away/bye/active mention
    TeamScope,
    /// Broadcast, venue, or scheduling words with neither cue above
    GenericScheduling,
}

/// One entry of the nudge table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nudge {
    pub cue: Cue,
    pub family: TemplateFamily,
    pub delta: f32,
}

pub const NUDGES: &[Nudge] = &[
    Nudge {
        cue: Cue::SequenceLanguage,
        family: TemplateFamily::Sequence,
        delta: 0.10,
    },
    Nudge {
        cue: Cue::SequenceLanguage,
        family: TemplateFamily::GameScheduling,
        delta: -0.05,
    },
    Nudge {
        cue: Cue::TeamScope,
        family: TemplateFamily::TeamPattern,
        delta: 0.10,
    },
    Nudge {
        cue: Cue::TeamScope,
        family: TemplateFamily::Sequence,
        delta: -0.05,
    },
    Nudge {
        cue: Cue::GenericScheduling,
        family: TemplateFamily::GameScheduling,
        delta: 0.01,
    },
];

static SEQUENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SEQUENCE_WORDS).expect("Invalid regex"));
static BYE_ADJACENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BYE_ADJACENT).expect("Invalid regex"));
static TEAM_SCOPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TEAM_SCOPE).expect("Invalid regex"));
static GAME_KIND_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GAME_KIND).expect("Invalid regex"));
static SCHEDULING_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(espn|cbs|fox|abc|nbc|tnt|network|venue|rivalr|schedul)")
        .expect("Invalid regex")
});

/// Cues present in `query`.
#[must_use]
pub fn detect_cues(query: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    if SEQUENCE_PATTERN.is_match(query) || BYE_ADJACENT_PATTERN.is_match(query) {
        cues.push(Cue::SequenceLanguage);
    }
    if TEAM_SCOPE_PATTERN.is_match(query) && GAME_KIND_PATTERN.is_match(query) {
        cues.push(Cue::TeamScope);
    }
    if cues.is_empty() && SCHEDULING_VOCABULARY.is_match(query) {
        cues.push(Cue::GenericScheduling);
    }
    cues
}

/// Re-ranks with the [`NUDGES`] table.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalReranker;

impl LexicalReranker {
    fn nudge_for_cues(cues: &[Cue], family: TemplateFamily) -> f32 {
        NUDGES
            .iter()
            .filter(|n| n.family == family && cues.contains(&n.cue))
            .map(|n| n.delta)
            .sum()
    }
}

impl Reranker for LexicalReranker {
    fn nudge(&self, query: &str, family: TemplateFamily) -> f32 {
        Self::nudge_for_cues(&detect_cues(query), family)
    }

    fn rerank(&self, query: &str, neighbors: Vec<Neighbor>) -> Vec<Neighbor> {
        // Cues depend only on the query, so detect them once
        let cues = detect_cues(query);
        debug!(?cues, candidates = neighbors.len(), "re-ranking shortlist");
        apply_nudges(neighbors, |family| Self::nudge_for_cues(&cues, family))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CorpusExample;

    fn neighbor(family: TemplateFamily, distance: f32) -> Neighbor {
        Neighbor {
            example: CorpusExample::new(family, format!("{family:?} example")),
            distance,
        }
    }

    fn families(neighbors: &[Neighbor]) -> Vec<TemplateFamily> {
        neighbors.iter().map(|n| n.example.family).collect()
    }

    #[test]
    fn test_detect_cues() {
        assert_eq!(detect_cues("back-to-back road games"), vec![Cue::SequenceLanguage]);
        assert_eq!(
            detect_cues("home games either side of their bye"),
            vec![Cue::SequenceLanguage]
        );
        assert_eq!(
            detect_cues("no team plays more than 2 away games"),
            vec![Cue::TeamScope]
        );
        assert_eq!(
            detect_cues("every team has at most 2 consecutive away games"),
            vec![Cue::SequenceLanguage, Cue::TeamScope]
        );
        assert_eq!(detect_cues("rivalry games on ESPN"), vec![Cue::GenericScheduling]);
        assert!(detect_cues("make it fair").is_empty());
    }

    #[test]
    fn test_team_scope_needs_kind_mention() {
        assert!(detect_cues("every team gets a rest").is_empty());
    }

    #[test]
    fn test_sequence_language_reorders_bye_confusion() {
        // Embedding put a game-scheduling "bye" phrasing first
        let shortlist = vec![
            neighbor(TemplateFamily::GameScheduling, 0.20),
            neighbor(TemplateFamily::Sequence, 0.28),
        ];
        let ranked = LexicalReranker.rerank("no road games either side of their bye", shortlist);

        assert_eq!(
            families(&ranked),
            vec![TemplateFamily::Sequence, TemplateFamily::GameScheduling]
        );
        assert!((ranked[0].distance - 0.18).abs() < 1e-6);
        assert!((ranked[1].distance - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_team_scope_prefers_team_pattern() {
        let shortlist = vec![
            neighbor(TemplateFamily::Sequence, 0.30),
            neighbor(TemplateFamily::TeamPattern, 0.35),
        ];
        let ranked = LexicalReranker.rerank("each team gets 4 home games", shortlist);
        assert_eq!(families(&ranked), vec![TemplateFamily::TeamPattern, TemplateFamily::Sequence]);
    }

    #[test]
    fn test_combined_cues_sum() {
        let query = "every team has at most 2 consecutive away games";
        let nudge = |family| LexicalReranker.nudge(query, family);
        assert!((nudge(TemplateFamily::Sequence) - 0.05).abs() < 1e-6);
        assert!((nudge(TemplateFamily::TeamPattern) - 0.10).abs() < 1e-6);
        assert!((nudge(TemplateFamily::GameScheduling) + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_generic_nudge_is_small() {
        let nudge = LexicalReranker.nudge("rivalry games on ESPN", TemplateFamily::GameScheduling);
        assert!((nudge - 0.01).abs() < 1e-6);
        assert_eq!(LexicalReranker.nudge("rivalry games on ESPN", TemplateFamily::Sequence), 0.0);
    }

    #[test]
    fn test_adjusted_distance_is_clamped_at_zero() {
        let ranked = LexicalReranker.rerank(
            "back to back games",
            vec![neighbor(TemplateFamily::Sequence, 0.04)],
        );
        assert_eq!(ranked[0].distance, 0.0);
    }

    #[test]
    fn test_no_reranker_only_sorts() {
        let ranked = NoReranker.rerank(
            "back to back games",
            vec![
                neighbor(TemplateFamily::Sequence, 0.5),
                neighbor(TemplateFamily::GameScheduling, 0.1),
            ],
        );
        assert_eq!(
            families(&ranked),
            vec![TemplateFamily::GameScheduling, TemplateFamily::Sequence]
        );
        assert_eq!(ranked[1].distance, 0.5);
    }

    #[test]
    fn test_apply_nudges_floors_and_keeps_ties() {
        let shortlist = vec![
            neighbor(TemplateFamily::TeamPattern, 0.05),
            neighbor(TemplateFamily::GameScheduling, 0.3),
            neighbor(TemplateFamily::Sequence, 0.3),
        ];
        let ranked = apply_nudges(shortlist, |family| match family {
            TemplateFamily::TeamPattern => 0.1,
            _ => 0.0,
        });

        assert_eq!(ranked[0].distance, 0.0);
        assert_eq!(
            families(&ranked),
            vec![
                TemplateFamily::TeamPattern,
                TemplateFamily::GameScheduling,
                TemplateFamily::Sequence
            ]
        );
    }

    #[test]
    fn test_default_rerank_matches_lexical() {
        struct TableOnly;
        impl Reranker for TableOnly {
            fn nudge(&self, query: &str, family: TemplateFamily) -> f32 {
                LexicalReranker.nudge(query, family)
            }
        }

        let query = "each team has 2 bye weeks either side of the bye";
        let shortlist = vec![
            neighbor(TemplateFamily::GameScheduling, 0.2),
            neighbor(TemplateFamily::Sequence, 0.25),
            neighbor(TemplateFamily::TeamPattern, 0.3),
        ];
        assert_eq!(
            TableOnly.rerank(query, shortlist.clone()),
            LexicalReranker.rerank(query, shortlist)
        );
    }
}
