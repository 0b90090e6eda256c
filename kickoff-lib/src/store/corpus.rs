use std::fs;
use std::path::Path;

use crate::store::CorpusExample;
use crate::template::TemplateFamily;
use crate::{Error, Result};

const GAME_SCHEDULING_PHRASINGS: &[&str] = &[
    "Ensure that at least <min> and at most <max> games from <games or matchups or byes> are scheduled across <rounds> and played in any venue from <venues> and assigned to any of <networks>.",
    "Schedule between <min> and <max> <games or matchups or byes> across <rounds>, at any venue in <venues>, and on any of <networks>.",
    "Across <rounds>, ensure the count of <games or matchups or byes> is within [<min>, <max>], with games at venues from <venues> and carried by <networks>.",
    "Make sure at least <min> and at most <max> <games or matchups or byes> occur over <rounds>, played at <venues> and assigned to <networks>.",
    "At least <min> of <games or matchups or byes> should be scheduled on the final <k> dates of the season and on either <networks>.",
    "Schedule at least <min> of <games or matchups or byes> on the final <k> dates of the season and carry them on <networks> such as CBS or ESPN.",
    "Ensure at least <min> of specific matchups like UTN@VU, ALA@AU, MSU@UM are scheduled within the final <k> dates of the season and broadcast on <networks> (for example CBS or ESPN).",
    "Ensure all rivalry <games or matchups or byes> are scheduled on weekend <rounds> and aired on <networks>.",
    "Do not schedule any high profile <games or matchups or byes> on weekday <rounds> on <networks>; they should be placed on weekend <rounds> instead.",
];

const SEQUENCE_PHRASINGS: &[&str] = &[
    "Ensure at least <min> and at most <max> cases where there is a sequence <games or matchups or byes>, <games or matchups or byes>, ... across rounds <round1>, <round2>.",
    "Across rounds <round1>, <round2>, require between <min> and <max> occurrences of the sequence <games or matchups or byes>, <games or matchups or byes>, ....",
    "Guarantee that the number of sequences <games or matchups or byes>, <games or matchups or byes>, ... over rounds <round1>, <round2> lies within [<min>, <max>].",
    "Ensure the sequence pattern of <games or matchups or byes> across <round1>, <round2> appears at least <min> and at most <max> times.",
    "Ensure that for selected teams in <teams>, there are at least <min> and at most <max> cases where they do not have a home game in the round before their bye and the round after their bye.",
    "Make sure the sequence of rounds immediately before and after a bye week (rounds <round_before_bye>, <round_after_bye>) satisfies a constraint on where <games or matchups or byes> are played.",
    "Require between <min> and <max> cases where a team plays at two specified opponents in back-to-back weeks in the second half of the season.",
    "Ensure that there are at least <min> and at most <max> sequences where a team is scheduled for consecutive away <games or matchups or byes> at different opponents across rounds <round1>, <round2>.",
    "Across rounds <round1>, <round2>, require the sequence <team @ opp1>, <team @ opp2> in adjacent weeks.",
    "Guarantee that consecutive-week sequences involving specified opponents occur between <min> and <max> times in the latter half of the season.",
];

const TEAM_PATTERN_PHRASINGS: &[&str] = &[
    "Ensure that <each of/all> teams in <teams> have at least <min> and at most <max> instances where they play <home/away/bye/active> across <rounds> at venues <venues> on <networks>.",
    "For teams in <teams>, enforce between <min> and <max> occurrences of <home/away/bye/active> across <rounds>, at <venues>, on <networks>.",
    "Each team in <teams> should meet the range [<min>, <max>] for <home/away/bye/active> appearances across <rounds>, scheduled at <venues> and broadcast on <networks>.",
    "Make sure every team in <teams> has at least <min> and at most <max> <home/away/bye/active> slots over <rounds>, using venues <venues> and networks <networks>.",
    "Ensure that each team in <teams> has at most <max> weekday <home/away/bye/active> games across early <rounds> and at least <min> weekend games on <networks>.",
    "Require that no team in <teams> has more than <max> consecutive <away> games across <rounds> at <venues>.",
    "Guarantee that every team in <teams> receives at least <min> bye weeks and at most <max> bye weeks across <rounds>, regardless of <venues> and <networks>.",
    "Ensure each team in <teams> has at least <min> and at most <max> home games across <rounds>, with a balanced distribution over <venues> and televised on <networks>.",
];

/// The built-in corpus of canonical phrasings, grouped by family.
#[must_use]
pub fn canonical_corpus() -> Vec<CorpusExample> {
    TemplateFamily::ALL
        .into_iter()
        .flat_map(|family| {
            let phrasings = match family {
                TemplateFamily::GameScheduling => GAME_SCHEDULING_PHRASINGS,
                TemplateFamily::Sequence => SEQUENCE_PHRASINGS,
                TemplateFamily::TeamPattern => TEAM_PATTERN_PHRASINGS,
            };
            phrasings
                .iter()
                .map(move |text| CorpusExample::new(family, *text))
        })
        .collect()
}

/// Load a corpus from a JSON array of `{"family": ..., "text": ...}` objects.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<CorpusExample>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::Store(format!("failed to read {}: {e}", path.display())))?;
    parse_corpus(&raw)
}

/// Parse a corpus from JSON text (see [`load_corpus`]).
pub fn parse_corpus(raw: &str) -> Result<Vec<CorpusExample>> {
    let examples: Vec<CorpusExample> = serde_json::from_str(raw)
        .map_err(|e| Error::Store(format!("invalid corpus: {e}")))?;
    if let Some(blank) = examples.iter().position(|e| e.text.trim().is_empty()) {
        return Err(Error::Store(format!("corpus entry {blank} has blank text")));
    }
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_corpus_covers_every_family() {
        let corpus = canonical_corpus();
        for family in TemplateFamily::ALL {
            assert!(corpus.iter().any(|e| e.family == family), "{family}");
        }
        assert_eq!(corpus.len(), 27);
    }

    #[test]
    fn test_canonical_corpus_has_no_duplicates() {
        let corpus = canonical_corpus();
        let unique: std::collections::HashSet<_> = corpus.iter().collect();
        assert_eq!(unique.len(), corpus.len());
    }

    #[test]
    fn test_parse_corpus() {
        let raw = r#"[
            {"family": "sequence", "text": "Back-to-back road games"},
            {"family": "team_pattern", "text": "Every team gets a bye"}
        ]"#;
        let corpus = parse_corpus(raw).unwrap();
        assert_eq!(corpus[0], CorpusExample::new(TemplateFamily::Sequence, "Back-to-back road games"));
        assert_eq!(corpus[1].family, TemplateFamily::TeamPattern);
    }

    #[test]
    fn test_parse_corpus_rejects_unknown_family() {
        let raw = r#"[{"family": "venue", "text": "At neutral sites"}]"#;
        assert!(matches!(parse_corpus(raw), Err(Error::Store(_))));
    }

    #[test]
    fn test_parse_corpus_rejects_blank_text() {
        let raw = r#"[{"family": "sequence", "text": "  "}]"#;
        assert!(matches!(parse_corpus(raw), Err(Error::Store(_))));
    }

    #[test]
    fn test_load_corpus_missing_file() {
        assert!(matches!(
            load_corpus("/nonexistent/kickoff/corpus.json"),
            Err(Error::Store(_))
        ));
    }
}
