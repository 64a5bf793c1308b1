use crate::gallery::{Gallery, Identity};

/// Minimum cosine similarity for a probe to count as a known identity.
///
/// This is the single open-set control: lower values accept more matches
/// (higher recall, more false accepts), higher values reject more.
pub const DEFAULT_THRESHOLD: f32 = 0.4;

/// Outcome of matching one probe embedding against a gallery.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchLabel {
    /// Best identity at or above the threshold.
    Known {
        id: String,
        name: String,
        age: u32,
        gender: String,
    },
    /// No identity reached the threshold.
    Unknown,
}

impl MatchLabel {
    fn known(person: &Identity) -> Self {
        Self::Known {
            id: person.id.clone(),
            name: person.name.clone(),
            age: person.age,
            gender: person.gender.clone(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// A match decision plus the best similarity observed.
///
/// The score is reported even for [`MatchLabel::Unknown`] so callers can see
/// how close the nearest identity came.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub label: MatchLabel,
    pub score: f32,
}

/// Compute the cosine similarity between two vectors.
///
/// Returns a value in `[-1, 1]` where 1 means identical direction.
/// Uses f64 intermediate precision and clamps against floating point error.
/// Returns 0.0 for zero vectors or dimension mismatches; never panics.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;

    for i in 0..a.len() {
        let ai = a[i] as f64;
        let bi = b[i] as f64;
        dot += ai * bi;
        norm_a += ai * ai;
        norm_b += bi * bi;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    similarity.clamp(-1.0, 1.0) as f32
}

/// Open-set nearest match of a probe embedding against a gallery snapshot.
///
/// Each identity's representative score is the maximum similarity over its
/// stored embeddings. The running best across identities uses a strict `>`
/// comparison starting from 0.0, so the first identity in gallery order wins
/// ties and identities at or below 0 similarity are never selected.
///
/// An empty gallery (or one where no identity has embeddings) yields
/// `(Unknown, 0.0)`.
pub fn best_match(probe: &[f32], gallery: &Gallery, threshold: f32) -> Match {
    let mut best_score: f32 = 0.0;
    let mut best: Option<&Identity> = None;

    for person in gallery.iter() {
        let mut person_score: f32 = 0.0;
        for emb in &person.embeddings {
            let sim = cosine_similarity(probe, emb);
            if sim > person_score {
                person_score = sim;
            }
        }
        if person_score > best_score {
            best_score = person_score;
            best = Some(person);
        }
    }

    match best {
        Some(person) if best_score >= threshold => Match {
            label: MatchLabel::known(person),
            score: best_score,
        },
        _ => Match {
            label: MatchLabel::Unknown,
            score: best_score,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, embeddings: Vec<Vec<f32>>) -> Identity {
        Identity {
            id: id.to_string(),
            name: id.to_string(),
            age: 30,
            gender: "Unknown".to_string(),
            embeddings,
        }
    }

    fn matched_id(m: &Match) -> Option<&str> {
        match &m.label {
            MatchLabel::Known { id, .. } => Some(id.as_str()),
            MatchLabel::Unknown => None,
        }
    }

    #[test]
    fn cosine_identical() {
        let s = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((s - 1.0).abs() < 0.001, "identical: got {s}");
    }

    #[test]
    fn cosine_orthogonal() {
        let s = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(s.abs() < 0.001, "orthogonal: got {s}");
    }

    #[test]
    fn cosine_opposite() {
        let s = cosine_similarity(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]);
        assert!((s + 1.0).abs() < 0.001, "opposite: got {s}");
    }

    #[test]
    fn cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn empty_gallery_is_unknown_with_zero_score() {
        let m = best_match(&[1.0, 0.0], &Gallery::default(), DEFAULT_THRESHOLD);
        assert_eq!(m.label, MatchLabel::Unknown);
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn embeddingless_gallery_is_unknown_with_zero_score() {
        let g = Gallery::new(vec![person("a", vec![]), person("b", vec![])]);
        let m = best_match(&[1.0, 0.0], &g, DEFAULT_THRESHOLD);
        assert_eq!(m.label, MatchLabel::Unknown);
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn self_similarity_matches_with_score_one() {
        let emb = vec![0.3, -0.2, 0.9, 0.1];
        let g = Gallery::new(vec![person("a", vec![emb.clone()])]);
        let m = best_match(&emb, &g, 1.0);
        assert_eq!(matched_id(&m), Some("a"));
        assert!((m.score - 1.0).abs() < 1e-6, "got {}", m.score);
    }

    #[test]
    fn deterministic_over_repeated_calls() {
        let g = Gallery::new(vec![
            person("a", vec![vec![1.0, 0.0], vec![0.8, 0.6]]),
            person("b", vec![vec![0.0, 1.0]]),
        ]);
        let probe = [0.7, 0.3];
        let first = best_match(&probe, &g, DEFAULT_THRESHOLD);
        for _ in 0..10 {
            assert_eq!(best_match(&probe, &g, DEFAULT_THRESHOLD), first);
        }
    }

    #[test]
    fn ties_resolve_to_earlier_identity() {
        let shared = vec![1.0, 0.0, 0.0];
        let g = Gallery::new(vec![
            person("first", vec![shared.clone()]),
            person("second", vec![shared.clone()]),
        ]);
        let m = best_match(&shared, &g, DEFAULT_THRESHOLD);
        assert_eq!(matched_id(&m), Some("first"));

        // Same embeddings in reverse gallery order flip the winner.
        let g = Gallery::new(vec![
            person("second", vec![shared.clone()]),
            person("first", vec![shared.clone()]),
        ]);
        let m = best_match(&shared, &g, DEFAULT_THRESHOLD);
        assert_eq!(matched_id(&m), Some("second"));
    }

    #[test]
    fn best_identity_above_threshold_wins() {
        // Probe at 0.6 similarity to one of A's embeddings, ~0.28 to B's best.
        let probe = [0.6, 0.8];
        let g = Gallery::new(vec![
            person("A", vec![vec![0.0, -1.0], vec![1.0, 0.0], vec![-1.0, 0.0]]),
            person("B", vec![vec![1.0, -0.375], vec![0.0, -1.0]]),
        ]);
        let m = best_match(&probe, &g, DEFAULT_THRESHOLD);
        assert_eq!(matched_id(&m), Some("A"));
        assert!((m.score - 0.6).abs() < 1e-6, "got {}", m.score);
    }

    #[test]
    fn below_threshold_reports_unknown_with_best_score() {
        let probe = [1.0, 0.0];
        // Best similarity is ~0.2, below the 0.4 default.
        let g = Gallery::new(vec![
            person("A", vec![vec![0.2, 0.98]]),
            person("B", vec![vec![0.0, 1.0]]),
        ]);
        let m = best_match(&probe, &g, DEFAULT_THRESHOLD);
        assert_eq!(m.label, MatchLabel::Unknown);
        assert!(m.score > 0.15 && m.score < 0.25, "got {}", m.score);
    }

    #[test]
    fn threshold_monotonicity() {
        let probe = [1.0, 0.2];
        let g = Gallery::new(vec![person("A", vec![vec![1.0, 0.0]])]);
        let at = best_match(&probe, &g, 0.9);
        assert_eq!(matched_id(&at), Some("A"));
        // Matching at T implies matching at any T' <= T.
        for t in [0.7, 0.4, 0.1, 0.0] {
            assert_eq!(matched_id(&best_match(&probe, &g, t)), Some("A"));
        }
    }

    #[test]
    fn zero_probe_is_unknown() {
        let g = Gallery::new(vec![person("A", vec![vec![1.0, 0.0]])]);
        let m = best_match(&[0.0, 0.0], &g, DEFAULT_THRESHOLD);
        assert_eq!(m.label, MatchLabel::Unknown);
        assert_eq!(m.score, 0.0);
    }
}
