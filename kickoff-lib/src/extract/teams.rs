use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::extract::{or_fallback, push_unique, ALL_TEAMS, NETWORKS};

/// Known multi-word team names, in canonical spelling.
///
/// Matched before any generic capitalisation heuristic so a name such as
/// "Penn State" is never split into "Penn" and "State".
pub const TEAM_DICTIONARY: &[&str] = &[
    "Penn State",
    "Ohio State",
    "Michigan State",
    "Florida State",
    "Iowa State",
    "Kansas State",
    "Oklahoma State",
    "Oregon State",
    "Arizona State",
    "Mississippi State",
    "Boise State",
    "San Diego State",
    "Notre Dame",
    "Texas A&M",
    "Texas Tech",
    "Georgia Tech",
    "Virginia Tech",
    "Boston College",
    "Wake Forest",
    "North Carolina",
    "South Carolina",
    "Ole Miss",
];

/// Vocabulary that is capitalised often enough in constraint text to be
/// mistaken for a team: grammar words, constraint keywords, calendar words.
const STOP_WORDS: &[&str] = &[
    // articles, pronouns, conjunctions, prepositions
    "a", "an", "the", "and", "or", "but", "nor", "of", "in", "on", "at", "to", "for", "from",
    "by", "with", "within", "across", "over", "into", "per", "than", "then", "that", "this",
    "these", "those", "each", "every", "all", "any", "no", "none", "not", "do", "does", "is",
    "are", "be", "it", "its", "their", "they", "them", "there", "where", "when", "which", "who",
    "as", "if", "so", "such", "both", "either", "neither", "between", "among", "around",
    "before", "after", "during", "until", "up", "out", "about", "under", "only", "some",
    "other", "more", "most", "least", "few", "many", "can", "will", "should", "must", "may",
    "also", "just", "we", "our", "i",
    // constraint grammar
    "ensure", "schedule", "scheduled", "scheduling", "require", "requires", "guarantee",
    "make", "sure", "avoid", "allow", "prevent", "limit", "keep", "place", "placed", "play",
    "plays", "played", "assign", "assigned", "broadcast", "aired", "carry", "game", "games",
    "round", "rounds", "week", "weeks", "date", "dates", "season", "team", "teams", "home",
    "away", "road", "bye", "byes", "active", "venue", "venues", "network", "networks",
    "rivalry", "rivalries", "matchup", "matchups", "sequence", "sequences", "consecutive",
    "case", "cases", "instance", "instances", "night", "nights", "final", "last", "first",
    "second", "half", "conference", "division", "opponent", "opponents", "back", "high",
    "profile", "times", "total", "please", "zero", "one", "two", "three", "four", "five",
    // calendar
    "weekend", "weekends", "weekday", "weekdays", "monday", "tuesday", "wednesday",
    "thursday", "friday", "saturday", "sunday", "mon", "tue", "tues", "wed", "thu", "thur",
    "thurs", "fri", "sat", "sun", "january", "february", "march", "april", "june", "july",
    "august", "september", "october", "november", "december",
    // leagues and media
    "nba", "nfl", "nhl", "mlb", "ncaa", "tv",
];

static STOP_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    STOP_WORDS
        .iter()
        .copied()
        .chain(NETWORKS.iter().copied())
        .map(str::to_ascii_lowercase)
        .collect()
});

static DICTIONARY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<String> = TEAM_DICTIONARY
        .iter()
        .map(|name| {
            name.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    Regex::new(&format!(r"(?i)\b({})\b", names.join("|"))).expect("Invalid regex")
});

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z&]*").expect("Invalid regex"));

fn canonical_name(matched: &str) -> Option<&'static str> {
    let normalized = matched.split_whitespace().collect::<Vec<_>>().join(" ");
    TEAM_DICTIONARY
        .iter()
        .copied()
        .find(|name| name.eq_ignore_ascii_case(&normalized))
}

fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(&word.to_ascii_lowercase())
}

/// `Alabama`, not `ALABAMA` or `alabama`.
fn is_proper_case(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && word.len() >= 2
        && chars.all(|c| c.is_ascii_lowercase())
}

/// Short all-caps code such as `MSU` or `UCLA`.
fn is_team_code(word: &str) -> bool {
    (2..=4).contains(&word.len()) && word.chars().all(|c| c.is_ascii_uppercase())
}

struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
}

/// Extract team codes and names.
///
/// Runs in passes, inserting in this order:
/// 1. names from [`TEAM_DICTIONARY`] (case-insensitive, canonical spelling)
/// 2. other runs of two or more adjacent Proper-Case words
/// 3. single Proper-Case words and 2-4 letter all-caps codes
///
/// Stop words are never part of a name, and no single word is taken if it is
/// a piece of a multi-word name found in passes 1 or 2. Duplicates are removed
/// keeping first-seen order. Returns `["all_teams"]` when nothing matches.
#[must_use]
pub fn extract_teams(text: &str) -> Vec<String> {
    let mut teams = Vec::new();
    let mut pieces: HashSet<String> = HashSet::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();

    for m in DICTIONARY_PATTERN.find_iter(text) {
        if let Some(name) = canonical_name(m.as_str()) {
            push_unique(&mut teams, name);
            pieces.extend(name.split_whitespace().map(str::to_ascii_lowercase));
            claimed.push(m.range());
        }
    }

    let tokens: Vec<Token<'_>> = TOKEN_PATTERN
        .find_iter(text)
        .filter(|m| !claimed.iter().any(|r| r.start < m.end() && m.start() < r.end))
        .map(|m| Token {
            text: m.as_str(),
            span: m.range(),
        })
        .collect();

    // Group adjacent name-like tokens into runs; runs of one are singles.
    let mut runs: Vec<Vec<&Token<'_>>> = Vec::new();
    let mut previous_name_like = false;
    for (i, token) in tokens.iter().enumerate() {
        if !is_proper_case(token.text) || is_stop_word(token.text) {
            previous_name_like = false;
            continue;
        }
        let adjacent = previous_name_like
            && text[tokens[i - 1].span.end..token.span.start]
                .chars()
                .all(char::is_whitespace);
        match runs.last_mut() {
            Some(run) if adjacent => run.push(token),
            _ => runs.push(vec![token]),
        }
        previous_name_like = true;
    }

    for run in runs.iter().filter(|run| run.len() > 1) {
        let name = run.iter().map(|t| t.text).collect::<Vec<_>>().join(" ");
        pieces.extend(run.iter().map(|t| t.text.to_ascii_lowercase()));
        push_unique(&mut teams, name);
    }

    for token in &tokens {
        let candidate = is_proper_case(token.text) || is_team_code(token.text);
        let lower = token.text.to_ascii_lowercase();
        if candidate && !is_stop_word(token.text) && !pieces.contains(&lower) {
            push_unique(&mut teams, token.text);
        }
    }

    or_fallback(teams, ALL_TEAMS)
}
