//! Heuristic classification and ranking
//!
//! Runs every family's detector, ranks families by score, builds the winner
//! and at most one runner-up.
//!
//! # Usage
//!
//! ```ignore
//! use kickoff_lib::classify::Classifier;
//!
//! let classifier = Classifier::new();
//! let result = classifier.classify("Ensure at least 2 rivalry games on ESPN")?;
//! println!("{} ({:.2})", result.family, result.confidence);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::Extraction;
use crate::template::{Parameters, TemplateFamily};
use crate::{Error, Result};

/// Policy thresholds applied on top of classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Below this confidence no constraint is produced
    pub low_confidence: f32,
    /// Alternatives are shown to callers only below this confidence
    pub show_alternatives_below: f32,
    /// A runner-up family needs a score above this to become an alternative
    pub alternative_min_score: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_confidence: 0.70,
            show_alternatives_below: 0.75,
            alternative_min_score: 0.30,
        }
    }
}

/// One family's score, as kept in the debug trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyScore {
    pub family: TemplateFamily,
    pub score: f32,
}

/// A secondary interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub reason: String,
    pub parsed_constraint: String,
    pub confidence: f32,
}

/// The classification of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub family: TemplateFamily,
    pub confidence: f32,
    /// `None` when the interpretation is not usable: confidence below
    /// [`Thresholds::low_confidence`] or nothing extracted from the text
    pub constraint: Option<String>,
    pub parameters: Parameters,
    pub alternatives: Vec<Alternative>,
    /// Every family's ranking score, highest first
    pub scores: Vec<FamilyScore>,
    /// Raw detector scores, highest first. Same as `scores` unless the
    /// ranking was fused with similarity evidence.
    pub detector_scores: Vec<FamilyScore>,
}

impl ClassificationResult {
    /// Returns `true` when the query could not be interpreted confidently.
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.constraint.is_none()
    }
}

/// Confidence of the winning family from its score.
#[must_use]
pub fn primary_confidence(score: f32) -> f32 {
    (0.6 + score * 0.4).min(0.99)
}

/// Confidence of the runner-up family from its score.
#[must_use]
pub fn alternative_confidence(score: f32) -> f32 {
    (0.5 + score * 0.4).min(0.90)
}

/// Reject missing or blank query text.
pub fn validate_query(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("query must not be blank".to_string()));
    }
    Ok(trimmed)
}

/// Score every family, highest first.
///
/// The sort is stable, so equal scores keep declaration order.
#[must_use]
pub fn detect_all(text: &str) -> Vec<FamilyScore> {
    let mut scores: Vec<FamilyScore> = TemplateFamily::ALL
        .into_iter()
        .map(|family| FamilyScore {
            family,
            score: family.detect(text),
        })
        .collect();
    sort_scores(&mut scores);
    scores
}

pub(crate) fn sort_scores(scores: &mut [FamilyScore]) {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Classifies queries using the detector rule tables.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    /// Create a classifier with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify `text` with the heuristic detectors alone.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let text = validate_query(text)?;
        let scores = detect_all(text);
        Ok(self.rank(text, scores.clone(), scores))
    }

    /// Classify `text` using externally computed family scores, e.g. scores
    /// fused with similarity evidence.
    ///
    /// The raw detector scores are kept alongside and name the alternative's
    /// score in its reason.
    pub fn classify_with_scores(
        &self,
        text: &str,
        mut scores: Vec<FamilyScore>,
    ) -> Result<ClassificationResult> {
        let text = validate_query(text)?;
        let detector_scores = detect_all(text);
        if scores.is_empty() {
            scores = detector_scores.clone();
        }
        sort_scores(&mut scores);
        Ok(self.rank(text, scores, detector_scores))
    }

    fn rank(
        &self,
        text: &str,
        scores: Vec<FamilyScore>,
        detector_scores: Vec<FamilyScore>,
    ) -> ClassificationResult {
        debug!(?scores, ?detector_scores, "family scores");

        let extraction = Extraction::from_text(text);
        let top = scores[0];
        let primary = top.family.build_from(text, &extraction);
        let confidence = primary_confidence(top.score);

        let alternatives = scores
            .get(1)
            .filter(|alt| alt.score > self.thresholds.alternative_min_score)
            .map(|alt| {
                let built = alt.family.build_from(text, &extraction);
                let raw = detector_scores
                    .iter()
                    .find(|s| s.family == alt.family)
                    .map_or(alt.score, |s| s.score);
                Alternative {
                    reason: format!(
                        "Also matched {} with score {raw:.2}",
                        alt.family.display_name()
                    ),
                    parsed_constraint: built.constraint,
                    confidence: alternative_confidence(alt.score),
                }
            })
            .into_iter()
            .collect();

        let usable = confidence >= self.thresholds.low_confidence && !extraction.is_empty();
        if !usable {
            debug!(confidence, family = %top.family, "low-confidence interpretation");
        }

        ClassificationResult {
            family: top.family,
            confidence,
            constraint: usable.then_some(primary.constraint),
            parameters: primary.parameters,
            alternatives,
            scores,
            detector_scores,
        }
    }
}
