//! Entity extraction from free-text constraints
//!
//! Every extractor is a total function of its input: it never fails and it
//! never returns an empty set. When no cue is found the result is a single
//! fallback tag (see the `ALL_*` / `ANY_*` constants) so a renderer always has
//! something to put in a placeholder.
//!
//! Extraction is independent of template family. [`Extraction::from_text`]
//! runs every extractor once and the result is shared by whichever family
//! wins classification.
//!
//! # Usage
//!
//! ```ignore
//! use kickoff_lib::extract::Extraction;
//!
//! let extraction = Extraction::from_text("At least 2 rivalry games on ESPN");
//! assert_eq!(extraction.bounds.min, Some(2));
//! assert_eq!(extraction.networks, vec!["ESPN"]);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

mod bounds;
mod rounds;
mod teams;

pub use bounds::*;
pub use rounds::*;
pub use teams::*;

/// Fallback game tag: the constraint applies to every game
pub const ALL_GAMES: &str = "all_games";
/// Fallback round tag: the constraint applies to every round
pub const ALL_ROUNDS: &str = "all_rounds";
/// Fallback venue tag
pub const ALL_VENUES: &str = "all_venues";
/// Fallback network tag: any broadcaster satisfies the constraint
pub const ANY_NETWORK: &str = "any_network";
/// Fallback team tag: no specific team was named
pub const ALL_TEAMS: &str = "all_teams";

/// Game tag for rivalry language
pub const RIVALRY_GAMES: &str = "rivalry_games";
/// Game tag for explicit bye mentions
pub const BYES: &str = "byes";

/// Closed broadcast network vocabulary, in canonical (uppercase) spelling
pub const NETWORKS: &[&str] = &["ESPN", "CBS", "FOX", "ABC", "NBC", "TNT"];

/// All fragments extracted from one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Numeric bounds, unresolved (no template defaults applied)
    pub bounds: Bounds,
    /// Games, matchups, or byes the constraint targets
    pub games: Vec<String>,
    /// Round categories
    pub rounds: Vec<String>,
    /// Venue tags
    pub venues: Vec<String>,
    /// Broadcast networks
    pub networks: Vec<String>,
    /// Team codes and names
    pub teams: Vec<String>,
}

impl Extraction {
    /// Run every extractor over `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            bounds: extract_bounds(text),
            games: extract_games(text),
            rounds: extract_rounds(text),
            venues: extract_venues(text),
            networks: extract_networks(text),
            teams: extract_teams(text),
        }
    }

    /// Returns `true` when no extractor found a cue: bounds are unspecified
    /// and every set holds only its fallback tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_unspecified()
            && is_fallback(&self.games, ALL_GAMES)
            && is_fallback(&self.rounds, ALL_ROUNDS)
            && is_fallback(&self.networks, ANY_NETWORK)
            && is_fallback(&self.teams, ALL_TEAMS)
    }
}

fn is_fallback(values: &[String], fallback: &str) -> bool {
    matches!(values, [only] if only == fallback)
}

/// Replace an empty set with its single fallback tag.
pub(crate) fn or_fallback(values: Vec<String>, fallback: &str) -> Vec<String> {
    if values.is_empty() {
        vec![fallback.to_string()]
    } else {
        values
    }
}

/// Push `value` unless it is already present, preserving first-seen order.
pub(crate) fn push_unique(values: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Parse a count written either as digits or as a small number word.
#[must_use]
pub fn parse_count(token: &str) -> Option<u32> {
    let token = token.trim();
    if let Ok(n) = token.parse() {
        return Some(n);
    }
    let n = match token.to_ascii_lowercase().as_str() {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        _ => return None,
    };
    Some(n)
}

/// Regex fragment matching a count in digits or words (see [`parse_count`]).
pub(crate) const COUNT: &str = r"(\d+|one|two|three|four|five|six|seven|eight|nine|ten)";

static NETWORK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({})\b", NETWORKS.join("|"))).expect("Invalid regex")
});
static RIVALRY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brivalr(y|ies)\b").expect("Invalid regex"));
static MATCHUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,4}@[A-Z]{2,4}\b").expect("Invalid regex"));
static BYE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbyes?\b").expect("Invalid regex"));

/// Extract broadcast networks from the closed [`NETWORKS`] vocabulary.
///
/// Matching is whole-word and case-insensitive; output is uppercase, in text
/// order, without duplicates.
#[must_use]
pub fn extract_networks(text: &str) -> Vec<String> {
    let mut networks = Vec::new();
    for m in NETWORK_PATTERN.find_iter(text) {
        push_unique(&mut networks, m.as_str().to_ascii_uppercase());
    }
    or_fallback(networks, ANY_NETWORK)
}

/// Extract game categories: rivalry games, literal `CODE@CODE` matchups
/// (kept verbatim), and byes.
#[must_use]
pub fn extract_games(text: &str) -> Vec<String> {
    let mut games = Vec::new();
    if RIVALRY_PATTERN.is_match(text) {
        push_unique(&mut games, RIVALRY_GAMES);
    }
    for m in MATCHUP_PATTERN.find_iter(text) {
        push_unique(&mut games, m.as_str());
    }
    if BYE_PATTERN.is_match(text) {
        push_unique(&mut games, BYES);
    }
    or_fallback(games, ALL_GAMES)
}

/// Extract venues.
///
/// Venues are not modelled yet, so every query targets all venues.
#[must_use]
pub fn extract_venues(_text: &str) -> Vec<String> {
    vec![ALL_VENUES.to_string()]
}
