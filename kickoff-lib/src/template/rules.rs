use std::sync::LazyLock;

use regex::Regex;

use crate::extract::BYE_ADJACENT;
use crate::template::TemplateFamily;

/// A weighted lexical trigger.
///
/// A rule fires when every one of its patterns matches the query. A
/// detector's score is the sum of the weights of the rules that fire, capped
/// at 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub weight: f32,
}

/// Team-scope language: "each team", "no team", "per-team", ...
pub(crate) const TEAM_SCOPE: &str = r"(?i)\b((each|every|no|any)\s+team|for\s+teams|per[\s-]?team)\b";
/// Home/away/bye/active mention.
pub(crate) const GAME_KIND: &str = r"(?i)\b(home|away|byes?|active)\b";
/// Sequence language without bye adjacency.
pub(crate) const SEQUENCE_WORDS: &str = r"(?i)\b(back[\s-]?to[\s-]?back|consecutive|in\s+a\s+row|sequences?)\b";

pub const GAME_SCHEDULING_RULES: &[Rule] = &[
    Rule {
        name: "game_reference",
        patterns: &[r"(?i)\brivalr(y|ies)\b|\bmatchups?\b|@|\bbyes?\b"],
        weight: 0.6,
    },
    Rule {
        name: "scheduling_verb",
        patterns: &[r"(?i)\bschedul(e|ed|es|ing)\b"],
        weight: 0.3,
    },
    Rule {
        name: "network",
        patterns: &[r"(?i)\b(espn|cbs|fox|abc|nbc|tnt)\b"],
        weight: 0.2,
    },
    Rule {
        name: "round_category",
        patterns: &[
            r"(?i)\b(week(end|day)s?|(final|last)\s+(\d+|two|three|four|five)\s+(weeks?|dates?|rounds?))\b",
        ],
        weight: 0.2,
    },
];

pub const SEQUENCE_RULES: &[Rule] = &[
    Rule {
        name: "back_to_back",
        patterns: &[SEQUENCE_WORDS],
        weight: 0.6,
    },
    Rule {
        name: "bye_adjacency",
        patterns: &[BYE_ADJACENT],
        weight: 0.6,
    },
    Rule {
        name: "across_rounds",
        patterns: &[r"(?i)\b(second\s+half|across\s+rounds)\b"],
        weight: 0.2,
    },
];

pub const TEAM_PATTERN_RULES: &[Rule] = &[
    Rule {
        name: "count_in_window",
        patterns: &[
            r"(?i)\b\d+\s+((home|away|bye|active)\s+)?(games?|byes?)\s+(in|within|over|across)\s+\d+\s+(nights?|rounds?|weeks?|dates?)\b",
        ],
        weight: 0.6,
    },
    Rule {
        name: "universal_quantifier",
        patterns: &[
            r"(?i)\b(for\s+(all|each|any|every)|(each|every|no|any)\s+team|per[\s-]?team|(all|conference)\s+teams)\b",
        ],
        weight: 0.4,
    },
    Rule {
        name: "team_scope_with_kind",
        patterns: &[TEAM_SCOPE, GAME_KIND],
        weight: 0.3,
    },
];

struct CompiledRules {
    rules: &'static [Rule],
    patterns: Vec<Vec<Regex>>,
}

impl CompiledRules {
    fn compile(rules: &'static [Rule]) -> Self {
        let patterns = rules
            .iter()
            .map(|rule| {
                rule.patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("Invalid regex"))
                    .collect()
            })
            .collect();
        Self { rules, patterns }
    }

    fn fired<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'static Rule> + 'a {
        self.rules
            .iter()
            .zip(&self.patterns)
            .filter(move |(_, patterns)| patterns.iter().all(|p| p.is_match(text)))
            .map(|(rule, _)| rule)
    }
}

static GAME_SCHEDULING: LazyLock<CompiledRules> =
    LazyLock::new(|| CompiledRules::compile(GAME_SCHEDULING_RULES));
static SEQUENCE: LazyLock<CompiledRules> =
    LazyLock::new(|| CompiledRules::compile(SEQUENCE_RULES));
static TEAM_PATTERN: LazyLock<CompiledRules> =
    LazyLock::new(|| CompiledRules::compile(TEAM_PATTERN_RULES));

fn compiled(family: TemplateFamily) -> &'static CompiledRules {
    match family {
        TemplateFamily::GameScheduling => &GAME_SCHEDULING,
        TemplateFamily::Sequence => &SEQUENCE,
        TemplateFamily::TeamPattern => &TEAM_PATTERN,
    }
}

/// Names of the rules of `family` that fire on `text`.
pub fn fired_rules(family: TemplateFamily, text: &str) -> Vec<&'static str> {
    compiled(family).fired(text).map(|rule| rule.name).collect()
}

/// Additive evidence score for `family`, clamped to `[0, 1]`.
pub fn score(family: TemplateFamily, text: &str) -> f32 {
    compiled(family)
        .fired(text)
        .map(|rule| rule.weight)
        .sum::<f32>()
        .min(1.0)
}
