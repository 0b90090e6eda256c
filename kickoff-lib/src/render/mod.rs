//! Result rendering
//!
//! Turns a classified query into what a caller sees: the canonical
//! constraint string with placeholders filled, and the [`Outcome`] that the
//! presentation layer consumes.

use serde::Serialize;

use crate::classify::{Alternative, ClassificationResult, FamilyScore, Thresholds};
use crate::extract::{ALL_GAMES, ALL_ROUNDS, ALL_TEAMS, ALL_VENUES, ANY_NETWORK};
use crate::template::{Parameters, PatternCount, TemplateFamily};

/// Placeholder tokens that may appear in a canonical phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Min,
    Max,
    Games,
    Rounds,
    Venues,
    Networks,
    Teams,
    Scope,
    K,
    Kind,
    M,
}

impl Placeholder {
    pub const ALL: [Self; 11] = [
        Self::Min,
        Self::Max,
        Self::Games,
        Self::Rounds,
        Self::Venues,
        Self::Networks,
        Self::Teams,
        Self::Scope,
        Self::K,
        Self::Kind,
        Self::M,
    ];

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Min => "{min}",
            Self::Max => "{max}",
            Self::Games => "{games}",
            Self::Rounds => "{rounds}",
            Self::Venues => "{venues}",
            Self::Networks => "{networks}",
            Self::Teams => "{teams}",
            Self::Scope => "{scope}",
            Self::K => "{k}",
            Self::Kind => "{kind}",
            Self::M => "{m}",
        }
    }

    fn value(self, parameters: &Parameters) -> String {
        let pattern = parameters.pattern.unwrap_or_default();
        match self {
            Self::Min => parameters.min.to_string(),
            Self::Max => parameters.max.to_string(),
            Self::Games => join_or(&parameters.games, ALL_GAMES),
            Self::Rounds => join_or(&parameters.rounds, ALL_ROUNDS),
            Self::Venues => join_or(&parameters.venues, ALL_VENUES),
            Self::Networks => join_or(&parameters.networks, ANY_NETWORK),
            Self::Teams => join_or(&parameters.teams, ALL_TEAMS),
            Self::Scope => pattern.scope.to_string(),
            Self::K => pattern.k.to_string(),
            Self::Kind => pattern.kind.to_string(),
            Self::M => pattern.m.to_string(),
        }
    }
}

fn join_or(values: &[String], fallback: &str) -> String {
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(", ")
    }
}

/// Fill `family`'s canonical phrasing from `parameters`.
///
/// Total: every placeholder is substituted, empty sets render as their
/// fallback tag and a missing team pattern renders with its defaults
/// ([`PatternCount::default`]).
#[must_use]
pub fn render_constraint(family: TemplateFamily, parameters: &Parameters) -> String {
    Placeholder::ALL
        .iter()
        .fold(family.phrasing().to_string(), |text, placeholder| {
            if text.contains(placeholder.token()) {
                text.replace(placeholder.token(), &placeholder.value(parameters))
            } else {
                text
            }
        })
}

/// What a caller receives for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The query maps confidently onto a template.
    Interpreted {
        template: &'static str,
        family: TemplateFamily,
        confidence: f32,
        parsed_constraint: String,
        parameters: Parameters,
        /// Only populated when confidence is below the alternatives threshold
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alternatives: Vec<Alternative>,
        #[serde(skip_serializing_if = "Option::is_none")]
        debug: Option<Vec<FamilyScore>>,
    },
    /// The query could not be interpreted confidently. This is an expected
    /// answer, not a failure.
    Unclear {
        message: &'static str,
        suggestion: String,
        best_guess: TemplateFamily,
        confidence: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        debug: Option<Vec<FamilyScore>>,
    },
}

impl Outcome {
    #[must_use]
    pub fn is_interpreted(&self) -> bool {
        matches!(self, Self::Interpreted { .. })
    }
}

const UNCLEAR_MESSAGE: &str = "Could not confidently interpret this constraint.";

/// Render the caller-facing outcome of a classification.
#[must_use]
pub fn render_outcome(
    result: &ClassificationResult,
    thresholds: &Thresholds,
    debug: bool,
) -> Outcome {
    let debug = debug.then(|| result.scores.clone());

    let Some(constraint) = &result.constraint else {
        return Outcome::Unclear {
            message: UNCLEAR_MESSAGE,
            suggestion: format!(
                "Try stating the count, the games and the rounds, for example: \"{}\"",
                result.family.example_query()
            ),
            best_guess: result.family,
            confidence: result.confidence,
            debug,
        };
    };

    let alternatives = if result.confidence < thresholds.show_alternatives_below {
        result.alternatives.clone()
    } else {
        Vec::new()
    };

    Outcome::Interpreted {
        template: result.family.display_name(),
        family: result.family,
        confidence: result.confidence,
        parsed_constraint: constraint.clone(),
        parameters: result.parameters.clone(),
        alternatives,
        debug,
    }
}

/// Count how many tokens from [`Placeholder::ALL`] remain in `text`.
#[must_use]
pub fn residual_placeholders(text: &str) -> usize {
    Placeholder::ALL
        .iter()
        .map(|p| text.matches(p.token()).count())
        .sum()
}
