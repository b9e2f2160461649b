//! Reaction comparison between a guessed substance and the hidden target.
//!
//! Each reagent is classified independently into one of three levels:
//! - `Exact`: both outcome strings are identical (sentinels included)
//! - `Present`: both substances visibly react, but differently
//! - `Absent`: anything else (one reacts and the other does not)
//!
//! ```
//! use drugle_logic::compare::{compare, MatchClass};
//! use drugle_logic::dataset::Substance;
//!
//! let a = Substance::new("a", "A")
//!     .with_reaction("marquis", "Orange")
//!     .with_reaction("mecke", "Brown");
//! let b = Substance::new("b", "B")
//!     .with_reaction("marquis", "Orange")
//!     .with_reaction("mecke", "Black");
//! let results = compare(&a, &b, &["marquis", "mecke"]);
//! assert_eq!(results[0].class, MatchClass::Exact);
//! assert_eq!(results[1].class, MatchClass::Present);
//! ```

use serde::{Deserialize, Serialize};

use crate::dataset::{Substance, NO_REACTION};

/// Three-level feedback for one reagent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchClass {
    Exact,
    Present,
    Absent,
}

impl MatchClass {
    pub const ALL: [MatchClass; 3] = [MatchClass::Exact, MatchClass::Present, MatchClass::Absent];

    /// Classify a target outcome against a guessed outcome.
    pub fn classify(target: &str, guess: &str) -> Self {
        if target == guess {
            Self::Exact
        } else if target != NO_REACTION && guess != NO_REACTION {
            Self::Present
        } else {
            Self::Absent
        }
    }

    /// Player-facing description shown next to a feedback tile.
    pub fn description(self) -> &'static str {
        match self {
            Self::Exact => "Exact match",
            Self::Present => "Both react (different colors)",
            Self::Absent => "Different reaction pattern",
        }
    }
}

/// Classification of a single reagent within a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReagentMatch {
    pub reagent_id: String,
    #[serde(rename = "match")]
    pub class: MatchClass,
}

/// Compare `guess` against `target` for every reagent id, preserving order.
///
/// Missing entries on either side read as `"No data"`, so a reagent known to
/// only one of the two substances classifies as `Absent` when the other side
/// is `"No reaction"` and as `Present` otherwise.
pub fn compare<S: AsRef<str>>(
    target: &Substance,
    guess: &Substance,
    reagent_ids: &[S],
) -> Vec<ReagentMatch> {
    reagent_ids
        .iter()
        .map(|id| {
            let id = id.as_ref();
            ReagentMatch {
                reagent_id: id.to_string(),
                class: MatchClass::classify(target.outcome(id), guess.outcome(id)),
            }
        })
        .collect()
}

/// Per-class counts for a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTally {
    pub exact: usize,
    pub present: usize,
    pub absent: usize,
}

pub fn tally(results: &[ReagentMatch]) -> MatchTally {
    let mut t = MatchTally::default();
    for r in results {
        match r.class {
            MatchClass::Exact => t.exact += 1,
            MatchClass::Present => t.present += 1,
            MatchClass::Absent => t.absent += 1,
        }
    }
    t
}

/// True when every reagent matched exactly.
pub fn is_solved(results: &[ReagentMatch]) -> bool {
    results.iter().all(|r| r.class == MatchClass::Exact)
}
