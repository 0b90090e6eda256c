//! Constraint template families
//!
//! The engine recognises a fixed, closed set of constraint shapes. Each
//! [`TemplateFamily`] carries:
//! - a display name and a canonical phrasing with `{placeholder}` tokens
//! - a detector: a table of weighted [`Rule`]s scored against the query
//! - a builder: fills [`Parameters`] from an [`Extraction`] using
//!   family-specific defaults for anything the text left unspecified
//!
//! Adding a family means adding a variant and its three arms below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extract::Extraction;
use crate::{Error, Result};

mod builders;
mod rules;

pub use builders::*;
pub use rules::*;

/// One of the three constraint shapes the engine recognises.
///
/// Declaration order is significant: it breaks ties between equal detector
/// scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateFamily {
    GameScheduling,
    Sequence,
    TeamPattern,
}

impl TemplateFamily {
    /// Every family, in declaration order.
    pub const ALL: [Self; 3] = [Self::GameScheduling, Self::Sequence, Self::TeamPattern];

    /// Stable identifier used in corpus files and JSON.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::GameScheduling => "game_scheduling",
            Self::Sequence => "sequence",
            Self::TeamPattern => "team_pattern",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::GameScheduling => "Template 1: Game Scheduling Constraints",
            Self::Sequence => "Template 2: Sequence Constraints",
            Self::TeamPattern => "Template 3: Team Schedule Pattern Constraints",
        }
    }

    /// Canonical phrasing with `{placeholder}` tokens, filled by
    /// [`render_constraint`](crate::render::render_constraint).
    #[must_use]
    pub fn phrasing(self) -> &'static str {
        match self {
            Self::GameScheduling => {
                "Ensure that at least {min} and at most {max} games from {games} are scheduled \
                 across {rounds} and played in any venue from {venues} and assigned to any of \
                 {networks}."
            }
            Self::Sequence => {
                "Ensure at least {min} and at most {max} cases where there is a sequence of \
                 {games} for {teams} across rounds {rounds}."
            }
            Self::TeamPattern => {
                "Ensure that {scope} of {teams} have at least {min} and at most {max} instances \
                 where they play {k} {kind} games within {m} rounds across {rounds} where the \
                 game is assigned to any of {networks} and played in any venue from {venues}."
            }
        }
    }

    /// A well-formed query for this family, offered when a query could not
    /// be interpreted confidently.
    #[must_use]
    pub fn example_query(self) -> &'static str {
        match self {
            Self::GameScheduling => {
                "Ensure at least 2 rivalry games are scheduled on weekend rounds on ESPN."
            }
            Self::Sequence => {
                "Require between 1 and 3 cases of back-to-back away games in the second half."
            }
            Self::TeamPattern => "Ensure every team has at most 2 cases of 3 away games in 4 rounds.",
        }
    }

    /// Bounds used for whichever side the text leaves unspecified.
    #[must_use]
    pub fn default_bounds(self) -> (u32, u32) {
        match self {
            Self::GameScheduling => (1, 999),
            Self::Sequence => (0, 999),
            Self::TeamPattern => (0, 2),
        }
    }

    /// The weighted rule table behind this family's detector.
    #[must_use]
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Self::GameScheduling => GAME_SCHEDULING_RULES,
            Self::Sequence => SEQUENCE_RULES,
            Self::TeamPattern => TEAM_PATTERN_RULES,
        }
    }

    /// Detector: how well `text` matches this family, in `[0, 1]`.
    #[must_use]
    pub fn detect(self, text: &str) -> f32 {
        rules::score(self, text)
    }

    /// Builder: extract from `text` and build this family's interpretation.
    #[must_use]
    pub fn build(self, text: &str) -> Interpretation {
        self.build_from(text, &Extraction::from_text(text))
    }

    /// Builder over an extraction that has already been computed.
    #[must_use]
    pub fn build_from(self, text: &str, extraction: &Extraction) -> Interpretation {
        let parameters = match self {
            Self::GameScheduling => builders::game_scheduling(extraction),
            Self::Sequence => builders::sequence(extraction),
            Self::TeamPattern => builders::team_pattern(text, extraction),
        };
        Interpretation::new(self, parameters)
    }
}

impl fmt::Display for TemplateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TemplateFamily {
    type Err = Error;

    /// Accepts the stable id (`game_scheduling`) or the display name, with or
    /// without its `Template N:` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|family| {
                let name = family.display_name();
                let bare = name.split_once(": ").map_or(name, |(_, rest)| rest);
                family.id().eq_ignore_ascii_case(s)
                    || name.eq_ignore_ascii_case(s)
                    || bare.eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| Error::InvalidInput(format!("unknown template family: {s}")))
    }
}

/// A family's constraint with its parameters filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub family: TemplateFamily,
    /// Canonical phrasing with every placeholder substituted
    pub constraint: String,
    pub parameters: Parameters,
}

impl Interpretation {
    fn new(family: TemplateFamily, parameters: Parameters) -> Self {
        Self {
            family,
            constraint: crate::render::render_constraint(family, &parameters),
            parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ALL_TEAMS, BYES};

    #[test]
    fn test_ids_roundtrip_through_from_str() {
        for family in TemplateFamily::ALL {
            assert_eq!(family.id().parse::<TemplateFamily>().unwrap(), family);
            assert_eq!(family.display_name().parse::<TemplateFamily>().unwrap(), family);
        }
    }

    #[test]
    fn test_from_str_accepts_bare_names() {
        let family: TemplateFamily = "Sequence Constraints".parse().unwrap();
        assert_eq!(family, TemplateFamily::Sequence);
        assert!("Template 4: Venue Constraints".parse::<TemplateFamily>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case_ids() {
        let json = serde_json::to_string(&TemplateFamily::TeamPattern).unwrap();
        assert_eq!(json, "\"team_pattern\"");
    }

    #[test]
    fn test_game_scheduling_defaults() {
        let built = TemplateFamily::GameScheduling.build("rivalry games on weekends");
        assert_eq!((built.parameters.min, built.parameters.max), (1, 999));
        assert_eq!(
            built.constraint,
            "Ensure that at least 1 and at most 999 games from rivalry_games are scheduled \
             across weekend_rounds and played in any venue from all_venues and assigned to any \
             of any_network."
        );
    }

    #[test]
    fn test_sequence_defaults_and_teams() {
        let built = TemplateFamily::Sequence
            .build("Penn State should not play road games on either side of their bye");
        assert_eq!((built.parameters.min, built.parameters.max), (0, 999));
        assert_eq!(built.parameters.teams, vec!["Penn State"]);
        assert_eq!(built.parameters.games, vec![BYES]);
    }

    #[test]
    fn test_team_pattern_defaults() {
        let built = TemplateFamily::TeamPattern.build("every team plays fairly");
        let pattern = built.parameters.pattern.unwrap();
        assert_eq!((built.parameters.min, built.parameters.max), (0, 2));
        assert_eq!((pattern.k, pattern.kind, pattern.m), (3, GameKind::Away, 4));
        assert_eq!(pattern.scope, Scope::Each);
        assert_eq!(built.parameters.teams, vec![ALL_TEAMS]);
    }

    #[test]
    fn test_explicit_bounds_override_defaults() {
        let built =
            TemplateFamily::TeamPattern.build("each team has at least 1 and at most 3 home stands");
        assert_eq!((built.parameters.min, built.parameters.max), (1, 3));
    }
}
