use serde::{Deserialize, Serialize};

use crate::classify::{sort_scores, FamilyScore};
use crate::store::Neighbor;
use crate::template::TemplateFamily;

/// How detector scores and corpus similarity are blended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Weight of the similarity score in `[0, 1]`; the detector gets the rest
    pub similarity_weight: f32,
    /// Shortlist size used for fusion
    pub top_k: usize,
    /// Neighbours retrieved before re-ranking
    pub candidates: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            similarity_weight: 0.5,
            top_k: 5,
            candidates: 10,
        }
    }
}

/// Similarity evidence for `family`: `1 - min distance` over its shortlist
/// entries, or 0 when none of them belongs to the family.
#[must_use]
pub fn family_similarity(neighbors: &[Neighbor], family: TemplateFamily) -> f32 {
    neighbors
        .iter()
        .filter(|n| n.example.family == family)
        .map(|n| n.distance)
        .min_by(f32::total_cmp)
        .map_or(0.0, |distance| (1.0 - distance).clamp(0.0, 1.0))
}

/// Blend detector scores with shortlist similarity, highest first.
///
/// `fused = (1 - w) * detector + w * similarity`. Families missing from
/// `detector` count as 0.
#[must_use]
pub fn fuse_scores(
    detector: &[FamilyScore],
    neighbors: &[Neighbor],
    weight: f32,
) -> Vec<FamilyScore> {
    let weight = weight.clamp(0.0, 1.0);

    let mut fused: Vec<FamilyScore> = TemplateFamily::ALL
        .into_iter()
        .map(|family| {
            let detected = detector
                .iter()
                .find(|s| s.family == family)
                .map_or(0.0, |s| s.score);
            let similarity = family_similarity(neighbors, family);
            FamilyScore {
                family,
                score: (1.0 - weight) * detected + weight * similarity,
            }
        })
        .collect();
    sort_scores(&mut fused);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CorpusExample;

    fn neighbor(family: TemplateFamily, distance: f32) -> Neighbor {
        Neighbor {
            example: CorpusExample::new(family, format!("{family} {distance}")),
            distance,
        }
    }

    fn score(family: TemplateFamily, score: f32) -> FamilyScore {
        FamilyScore { family, score }
    }

    fn find(scores: &[FamilyScore], family: TemplateFamily) -> f32 {
        scores.iter().find(|s| s.family == family).map(|s| s.score).unwrap()
    }

    #[test]
    fn test_family_similarity_uses_closest_entry() {
        let shortlist = vec![
            neighbor(TemplateFamily::Sequence, 0.3),
            neighbor(TemplateFamily::Sequence, 0.1),
            neighbor(TemplateFamily::TeamPattern, 1.4),
        ];
        assert!((family_similarity(&shortlist, TemplateFamily::Sequence) - 0.9).abs() < 1e-6);
        assert_eq!(family_similarity(&shortlist, TemplateFamily::TeamPattern), 0.0);
        assert_eq!(family_similarity(&shortlist, TemplateFamily::GameScheduling), 0.0);
    }

    #[test]
    fn test_fuse_scores_blends_evenly() {
        let detector = vec![
            score(TemplateFamily::TeamPattern, 0.7),
            score(TemplateFamily::Sequence, 0.6),
            score(TemplateFamily::GameScheduling, 0.0),
        ];
        let shortlist = vec![
            neighbor(TemplateFamily::Sequence, 0.1),
            neighbor(TemplateFamily::TeamPattern, 0.4),
        ];
        let fused = fuse_scores(&detector, &shortlist, 0.5);

        assert_eq!(fused[0].family, TemplateFamily::Sequence);
        assert!((find(&fused, TemplateFamily::Sequence) - 0.75).abs() < 1e-6);
        assert!((find(&fused, TemplateFamily::TeamPattern) - 0.65).abs() < 1e-6);
        assert_eq!(find(&fused, TemplateFamily::GameScheduling), 0.0);
    }

    #[test]
    fn test_zero_weight_keeps_detector_scores() {
        let detector = vec![score(TemplateFamily::GameScheduling, 1.0)];
        let shortlist = vec![neighbor(TemplateFamily::Sequence, 0.0)];
        let fused = fuse_scores(&detector, &shortlist, 0.0);

        assert_eq!(fused[0], score(TemplateFamily::GameScheduling, 1.0));
        assert_eq!(fused.len(), TemplateFamily::ALL.len());
    }

    #[test]
    fn test_weight_is_clamped() {
        let shortlist = vec![neighbor(TemplateFamily::Sequence, 0.2)];
        let fused = fuse_scores(&[], &shortlist, 3.0);
        assert!((find(&fused, TemplateFamily::Sequence) - 0.8).abs() < 1e-6);
    }
}
