//! Decoy selection for training rounds.
//!
//! A training round shows a sample under one substance's name (the *label*)
//! while the reactions actually observed and scored come from another
//! substance (the *ground truth*). The two must be similar enough to make the
//! deception fair: they have to share at least `threshold` identical reagent
//! outcomes.
//!
//! ```
//! use drugle_logic::confusable::find_confusable;
//! use drugle_logic::dataset::Substance;
//!
//! let a = Substance::new("a", "A").with_reaction("marquis", "Orange").with_reaction("mecke", "Brown");
//! let b = Substance::new("b", "B").with_reaction("marquis", "Orange").with_reaction("mecke", "Black");
//! let c = Substance::new("c", "C").with_reaction("marquis", "No reaction").with_reaction("mecke", "Brown");
//! let catalogue = vec![a.clone(), b, c];
//!
//! let ids: Vec<_> = find_confusable(&a, &catalogue, 1).iter().map(|s| s.id.as_str()).collect();
//! assert_eq!(ids, ["b", "c"]);
//! assert!(find_confusable(&a, &catalogue, 2).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::dataset::Substance;
use crate::rng::{self, RandomSource};

/// Number of reagents on which `candidate`'s recorded outcome also appears,
/// identically, on `subject`.
///
/// Only keys present on the candidate are considered; a reagent the subject
/// has no entry for never counts.
pub fn shared_outcomes(subject: &Substance, candidate: &Substance) -> usize {
    candidate
        .reactions
        .iter()
        .filter(|(reagent, outcome)| subject.reactions.get(*reagent) == Some(*outcome))
        .count()
}

/// Every catalogue member other than `subject` sharing at least `threshold`
/// outcomes with it, in catalogue order.
///
/// The threshold is inclusive. A threshold of 0 is treated as 1 so the
/// result never degenerates into "everything".
pub fn find_confusable<'a>(
    subject: &Substance,
    catalogue: &'a [Substance],
    threshold: usize,
) -> Vec<&'a Substance> {
    let threshold = threshold.max(1);
    catalogue
        .iter()
        .filter(|candidate| candidate.id != subject.id)
        .filter(|candidate| shared_outcomes(subject, candidate) >= threshold)
        .collect()
}

/// A drawn sample: the name shown to the player and the substance whose
/// reactions are actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round<'a> {
    pub label: &'a Substance,
    pub ground_truth: &'a Substance,
}

impl<'a> Round<'a> {
    /// Whether the label lies about the sample.
    pub fn is_decoy(&self) -> bool {
        self.label.id != self.ground_truth.id
    }

    pub fn to_sample(&self) -> Sample {
        Sample {
            label: self.label.clone(),
            ground_truth: self.ground_truth.clone(),
        }
    }
}

/// Owned counterpart of [`Round`], held by sessions between guesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub label: Substance,
    pub ground_truth: Substance,
}

impl Sample {
    pub fn is_decoy(&self) -> bool {
        self.label.id != self.ground_truth.id
    }
}

/// Draw a label uniformly, then with probability `decoy_probability` swap the
/// ground truth for a random confusable substance.
///
/// Draw order is fixed: one draw for the label, one for the decoy gate, and
/// one more for the decoy pick only when the gate opens and at least one
/// confusable substance exists. An empty catalogue yields `None`.
pub fn draw_round<'a, R: RandomSource + ?Sized>(
    catalogue: &'a [Substance],
    threshold: usize,
    decoy_probability: f64,
    rng: &mut R,
) -> Option<Round<'a>> {
    let label = &catalogue[rng::pick_index(rng, catalogue.len())?];

    let mut ground_truth = label;
    if rng::chance(rng, decoy_probability) {
        let decoys = find_confusable(label, catalogue, threshold);
        if let Some(i) = rng::pick_index(rng, decoys.len()) {
            ground_truth = decoys[i];
        }
    }

    Some(Round {
        label,
        ground_truth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, NO_REACTION};
    use crate::rng::ScriptedSource;

    fn catalogue() -> Vec<Substance> {
        vec![
            Substance::new("a", "A")
                .with_reaction("marquis", "Orange")
                .with_reaction("mecke", "Brown"),
            Substance::new("b", "B")
                .with_reaction("marquis", "Orange")
                .with_reaction("mecke", "Black"),
            Substance::new("c", "C")
                .with_reaction("marquis", NO_REACTION)
                .with_reaction("mecke", "Brown"),
        ]
    }

    fn ids(found: &[&Substance]) -> Vec<String> {
        found.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_threshold_one_and_two() {
        let cat = catalogue();
        assert_eq!(ids(&find_confusable(&cat[0], &cat, 1)), vec!["b", "c"]);
        assert!(find_confusable(&cat[0], &cat, 2).is_empty());
    }

    #[test]
    fn test_threshold_inclusive() {
        let cat = catalogue();
        let mut twin = cat[0].clone();
        twin.id = "a2".into();
        let mut with_twin = cat.clone();
        with_twin.push(twin);
        // exactly 2 shared outcomes qualifies at threshold 2
        assert_eq!(ids(&find_confusable(&with_twin[0], &with_twin, 2)), vec!["a2"]);
        assert!(find_confusable(&with_twin[0], &with_twin, 3).is_empty());
    }

    #[test]
    fn test_subject_never_included() {
        let cat = catalogue();
        for subject in &cat {
            for t in 0..4 {
                assert!(find_confusable(subject, &cat, t)
                    .iter()
                    .all(|s| s.id != subject.id));
            }
        }
    }

    #[test]
    fn test_zero_threshold_acts_as_one() {
        let mut cat = catalogue();
        cat.push(Substance::new("d", "D").with_reaction("marquis", "Blue"));
        assert_eq!(
            find_confusable(&cat[0], &cat, 0),
            find_confusable(&cat[0], &cat, 1)
        );
    }

    #[test]
    fn test_counts_only_candidate_keys() {
        let subject = Substance::new("s", "S").with_reaction("marquis", "Orange");
        let candidate = Substance::new("x", "X")
            .with_reaction("marquis", "Orange")
            .with_reaction("mecke", "No data");
        // subject has no mecke entry: never agrees, even with a literal "No data"
        assert_eq!(shared_outcomes(&subject, &candidate), 1);
        let sparse = Substance::new("y", "Y");
        assert_eq!(shared_outcomes(&subject, &sparse), 0);
    }

    #[test]
    fn test_monotonic_in_threshold_on_builtin() {
        let dataset = Dataset::builtin().unwrap();
        let cat = dataset.substances();
        for subject in cat {
            for t in 1..8 {
                let looser = ids(&find_confusable(subject, cat, t));
                let tighter = ids(&find_confusable(subject, cat, t + 1));
                assert!(tighter.iter().all(|id| looser.contains(id)));
            }
        }
    }

    #[test]
    fn test_zero_probability_never_decoys() {
        let cat = catalogue();
        for v in [0.0, 0.2, 0.5, 0.9] {
            let mut rng = ScriptedSource::new(vec![v]);
            let round = draw_round(&cat, 1, 0.0, &mut rng).unwrap();
            assert_eq!(round.label, round.ground_truth);
            assert!(!round.is_decoy());
        }
    }

    #[test]
    fn test_full_probability_always_decoys() {
        let cat = catalogue();
        for v in [0.0, 0.4, 0.7, 0.99] {
            let mut rng = ScriptedSource::new(vec![v]);
            let round = draw_round(&cat, 1, 1.0, &mut rng).unwrap();
            assert_ne!(round.label.id, round.ground_truth.id);
            assert!(find_confusable(round.label, &cat, 1).contains(&round.ground_truth));
        }
    }

    #[test]
    fn test_gate_branches() {
        let cat = catalogue();
        // label = a (0.0), gate 0.3 < 0.5 opens, pick 0.6 of [b, c] → c
        let mut rng = ScriptedSource::new(vec![0.0, 0.3, 0.6]);
        let round = draw_round(&cat, 1, 0.5, &mut rng).unwrap();
        assert_eq!(round.label.id, "a");
        assert_eq!(round.ground_truth.id, "c");
        assert_eq!(rng.draws(), 3);

        // gate 0.7 >= 0.5 stays closed, no third draw
        let mut rng = ScriptedSource::new(vec![0.0, 0.7, 0.6]);
        let round = draw_round(&cat, 1, 0.5, &mut rng).unwrap();
        assert_eq!(round.ground_truth.id, "a");
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn test_empty_confusable_degrades() {
        let cat = catalogue();
        let mut rng = ScriptedSource::new(vec![0.0, 0.0]);
        let round = draw_round(&cat, 2, 1.0, &mut rng).unwrap();
        assert_eq!(round.label.id, "a");
        assert_eq!(round.ground_truth.id, "a");
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn test_empty_catalogue() {
        let mut rng = ScriptedSource::new(vec![0.5]);
        assert!(draw_round(&[], 1, 1.0, &mut rng).is_none());
    }

    #[test]
    fn test_single_substance_catalogue() {
        let cat = vec![Substance::new("solo", "Solo").with_reaction("marquis", "Blue")];
        let round = draw_round(&cat, 1, 1.0, &mut || 0.5).unwrap();
        assert_eq!(round.label.id, "solo");
        assert!(!round.is_decoy());
    }

    #[test]
    fn test_sample_owns_round() {
        let cat = catalogue();
        let mut rng = ScriptedSource::new(vec![0.5, 0.0, 0.0]);
        let round = draw_round(&cat, 1, 1.0, &mut rng).unwrap();
        let sample = round.to_sample();
        assert_eq!(sample.label.id, "b");
        assert_eq!(sample.ground_truth.id, "a");
        assert!(sample.is_decoy());
    }
}
