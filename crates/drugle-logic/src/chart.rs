//! Reference color chart.
//!
//! Display-only: splits outcome strings into color steps and buckets each
//! step into a [`ColorFamily`] for rendering. Nothing in here feeds back
//! into scoring, which always compares whole outcome strings.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, NO_DATA, NO_REACTION};

/// Display bucket for a color step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorFamily {
    Purple,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
    Brown,
    Black,
    White,
    Other,
    NoReaction,
    NoData,
}

/// Keyword match order; the first hit wins ("Purple-Blue" is Purple).
const FAMILY_KEYWORDS: [(&str, ColorFamily); 9] = [
    ("Purple", ColorFamily::Purple),
    ("Blue", ColorFamily::Blue),
    ("Green", ColorFamily::Green),
    ("Yellow", ColorFamily::Yellow),
    ("Orange", ColorFamily::Orange),
    ("Red", ColorFamily::Red),
    ("Brown", ColorFamily::Brown),
    ("Black", ColorFamily::Black),
    ("White", ColorFamily::White),
];

/// Split an outcome into its color steps on `→` (over time) and `/` (mixed).
pub fn color_steps(outcome: &str) -> Vec<&str> {
    outcome
        .split(['→', '/'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn color_family(step: &str) -> ColorFamily {
    match step {
        NO_REACTION => ColorFamily::NoReaction,
        NO_DATA => ColorFamily::NoData,
        _ => FAMILY_KEYWORDS
            .iter()
            .find(|(kw, _)| step.contains(kw))
            .map(|(_, family)| *family)
            .unwrap_or(ColorFamily::Other),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartCell {
    pub reagent_id: String,
    pub outcome: String,
    pub families: Vec<ColorFamily>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRow {
    pub substance_id: String,
    pub substance_name: String,
    pub cells: Vec<ChartCell>,
}

/// One row per substance, one cell per reagent in panel order.
pub fn build_chart(dataset: &Dataset) -> Vec<ChartRow> {
    dataset
        .substances()
        .iter()
        .map(|substance| ChartRow {
            substance_id: substance.id.clone(),
            substance_name: substance.name.clone(),
            cells: dataset
                .reagents()
                .iter()
                .map(|reagent| {
                    let outcome = substance.outcome(&reagent.id);
                    ChartCell {
                        reagent_id: reagent.id.clone(),
                        outcome: outcome.to_string(),
                        families: color_steps(outcome)
                            .into_iter()
                            .map(color_family)
                            .collect(),
                    }
                })
                .collect(),
        })
        .collect()
}
