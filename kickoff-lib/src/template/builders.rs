use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::{parse_count, Extraction, COUNT};
use crate::template::TemplateFamily;

/// Parameters of a built constraint, with template defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub min: u32,
    pub max: u32,
    pub games: Vec<String>,
    pub rounds: Vec<String>,
    pub venues: Vec<String>,
    pub networks: Vec<String>,
    pub teams: Vec<String>,
    /// Per-team window ("K kind games within M rounds"), team patterns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternCount>,
}

impl Parameters {
    fn with_defaults(family: TemplateFamily, extraction: &Extraction) -> Self {
        let (default_min, default_max) = family.default_bounds();
        let (min, max) = extraction.bounds.resolve(default_min, default_max);
        Self {
            min,
            max,
            games: extraction.games.clone(),
            rounds: extraction.rounds.clone(),
            venues: extraction.venues.clone(),
            networks: extraction.networks.clone(),
            teams: extraction.teams.clone(),
            pattern: None,
        }
    }
}

/// Which teams a pattern applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Every team must satisfy the pattern
    #[default]
    Each,
    /// No team may exhibit the pattern
    No,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Each => "each",
            Self::No => "none",
        })
    }
}

/// Kind of game counted by a team pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Home,
    #[default]
    Away,
    Bye,
    Active,
}

impl GameKind {
    fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "home" => Some(Self::Home),
            "away" | "road" => Some(Self::Away),
            "bye" | "byes" => Some(Self::Bye),
            "active" => Some(Self::Active),
            _ => None,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Home => "home",
            Self::Away => "away",
            Self::Bye => "bye",
            Self::Active => "active",
        })
    }
}

/// "K games of `kind` within M rounds".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCount {
    pub scope: Scope,
    pub k: u32,
    pub kind: GameKind,
    pub m: u32,
}

impl Default for PatternCount {
    fn default() -> Self {
        Self {
            scope: Scope::Each,
            k: 3,
            kind: GameKind::Away,
            m: 4,
        }
    }
}

static K_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b{COUNT}\s+(home|away|road|bye|active)\s+games?\b"))
        .expect("Invalid regex")
});
static M_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(in|within|over|across)\s+{COUNT}\s+(nights?|rounds?|weeks?|dates?)\b"
    ))
    .expect("Invalid regex")
});
static KIND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(home|away|road|byes?|active)\b").expect("Invalid regex")
});
static NO_TEAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bno\s+team\b").expect("Invalid regex"));

/// Extract the per-team window of a team pattern.
///
/// The kind comes from the "K kind games" phrase when present, otherwise from
/// the first home/away/bye/active mention.
#[must_use]
pub fn extract_pattern_count(text: &str) -> PatternCount {
    let mut pattern = PatternCount::default();

    if let Some(caps) = K_PATTERN.captures(text) {
        if let Some(k) = caps.get(1).and_then(|m| parse_count(m.as_str())) {
            pattern.k = k;
        }
        if let Some(kind) = caps.get(2).and_then(|m| GameKind::parse(m.as_str())) {
            pattern.kind = kind;
        }
    } else if let Some(kind) = KIND_PATTERN
        .find(text)
        .and_then(|m| GameKind::parse(m.as_str()))
    {
        pattern.kind = kind;
    }

    if let Some(m) = M_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(2))
        .and_then(|m| parse_count(m.as_str()))
    {
        pattern.m = m;
    }

    if NO_TEAM_PATTERN.is_match(text) {
        pattern.scope = Scope::No;
    }

    pattern
}

pub(crate) fn game_scheduling(extraction: &Extraction) -> Parameters {
    Parameters::with_defaults(TemplateFamily::GameScheduling, extraction)
}

pub(crate) fn sequence(extraction: &Extraction) -> Parameters {
    Parameters::with_defaults(TemplateFamily::Sequence, extraction)
}

pub(crate) fn team_pattern(text: &str, extraction: &Extraction) -> Parameters {
    Parameters {
        pattern: Some(extract_pattern_count(text)),
        ..Parameters::with_defaults(TemplateFamily::TeamPattern, extraction)
    }
}
