//! Reference dataset: the reagent panel and the substance catalogue.
//!
//! The dataset is loaded once, validated, and then shared read-only by every
//! session (typically behind an `Arc`). Reaction outcomes are opaque strings;
//! nothing here interprets colors.
//!
//! ```
//! use drugle_logic::dataset::{Dataset, NO_DATA};
//!
//! let dataset = Dataset::builtin().unwrap();
//! let mdma = dataset.find_by_name("  mdma ").unwrap();
//! assert_eq!(mdma.outcome("marquis"), "Purple → Black");
//! assert_eq!(mdma.outcome("not-a-reagent"), NO_DATA);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Outcome recorded when a reagent produces no visible change.
pub const NO_REACTION: &str = "No reaction";

/// Outcome read for a reagent the substance has no entry for.
pub const NO_DATA: &str = "No data";

const BUILTIN_JSON: &str = include_str!("../../../data/reagent_tests.json");

/// A chemical test reagent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reagent {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A candidate substance and its observed outcome per reagent id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub reactions: BTreeMap<String, String>,
}

impl Substance {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            reactions: BTreeMap::new(),
        }
    }

    /// Builder-style helper for adding one reagent outcome.
    pub fn with_reaction(
        mut self,
        reagent_id: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Self {
        self.reactions.insert(reagent_id.into(), outcome.into());
        self
    }

    /// Outcome for `reagent_id`, or [`NO_DATA`] when there is no entry.
    pub fn outcome(&self, reagent_id: &str) -> &str {
        self.reactions
            .get(reagent_id)
            .map(String::as_str)
            .unwrap_or(NO_DATA)
    }
}

/// A single problem found while validating a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetIssue {
    #[error("dataset has no reagents")]
    NoReagents,
    #[error("dataset has no substances")]
    NoSubstances,
    #[error("reagent at position {0} has an empty id")]
    EmptyReagentId(usize),
    #[error("substance at position {0} has an empty id")]
    EmptySubstanceId(usize),
    #[error("substance '{0}' has an empty name")]
    EmptySubstanceName(String),
    #[error("duplicate reagent id '{0}'")]
    DuplicateReagentId(String),
    #[error("duplicate substance id '{0}'")]
    DuplicateSubstanceId(String),
    #[error("duplicate substance name '{0}'")]
    DuplicateSubstanceName(String),
    #[error("substance '{substance}' lists unknown reagent '{reagent}'")]
    UnknownReagent { substance: String, reagent: String },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid dataset ({} issue(s)): {}", .issues.len(), join_issues(.issues))]
    Invalid { issues: Vec<DatasetIssue> },
}

fn join_issues(issues: &[DatasetIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check a reagent panel and substance catalogue, returning every issue found.
pub fn validate_dataset(reagents: &[Reagent], substances: &[Substance]) -> Vec<DatasetIssue> {
    let mut issues = Vec::new();

    if reagents.is_empty() {
        issues.push(DatasetIssue::NoReagents);
    }
    if substances.is_empty() {
        issues.push(DatasetIssue::NoSubstances);
    }

    let mut reagent_ids = HashSet::new();
    for (i, reagent) in reagents.iter().enumerate() {
        if reagent.id.trim().is_empty() {
            issues.push(DatasetIssue::EmptyReagentId(i));
        } else if !reagent_ids.insert(reagent.id.as_str()) {
            issues.push(DatasetIssue::DuplicateReagentId(reagent.id.clone()));
        }
    }

    let mut substance_ids = HashSet::new();
    let mut names = HashSet::new();
    for (i, substance) in substances.iter().enumerate() {
        if substance.id.trim().is_empty() {
            issues.push(DatasetIssue::EmptySubstanceId(i));
        } else if !substance_ids.insert(substance.id.as_str()) {
            issues.push(DatasetIssue::DuplicateSubstanceId(substance.id.clone()));
        }

        let name_key = substance.name.trim().to_lowercase();
        if name_key.is_empty() {
            issues.push(DatasetIssue::EmptySubstanceName(substance.id.clone()));
        } else if !names.insert(name_key) {
            issues.push(DatasetIssue::DuplicateSubstanceName(substance.name.clone()));
        }

        for reagent in substance.reactions.keys() {
            if !reagent_ids.contains(reagent.as_str()) {
                issues.push(DatasetIssue::UnknownReagent {
                    substance: substance.id.clone(),
                    reagent: reagent.clone(),
                });
            }
        }
    }

    issues
}

/// Immutable reagent panel plus substance catalogue.
///
/// Deserializing goes through [`Dataset::new`], so a `Dataset` is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    reagents: Vec<Reagent>,
    substances: Vec<Substance>,
}

/// Unchecked document shape.
#[derive(Deserialize)]
struct RawDataset {
    reagents: Vec<Reagent>,
    substances: Vec<Substance>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DatasetError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Self::new(raw.reagents, raw.substances)
    }
}

impl Dataset {
    /// Build a dataset, rejecting it if [`validate_dataset`] finds anything.
    pub fn new(reagents: Vec<Reagent>, substances: Vec<Substance>) -> Result<Self, DatasetError> {
        let issues = validate_dataset(&reagents, &substances);
        if !issues.is_empty() {
            return Err(DatasetError::Invalid { issues });
        }
        Ok(Self {
            reagents,
            substances,
        })
    }

    /// Parse and validate a `{ "reagents": [...], "substances": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// The dataset bundled with the crate.
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::from_json(BUILTIN_JSON)
    }

    pub fn reagents(&self) -> &[Reagent] {
        &self.reagents
    }

    pub fn substances(&self) -> &[Substance] {
        &self.substances
    }

    /// Reagent ids in panel order.
    pub fn reagent_ids(&self) -> Vec<String> {
        self.reagents.iter().map(|r| r.id.clone()).collect()
    }

    pub fn reagent(&self, id: &str) -> Option<&Reagent> {
        self.reagents.iter().find(|r| r.id == id)
    }

    pub fn substance(&self, id: &str) -> Option<&Substance> {
        self.substances.iter().find(|s| s.id == id)
    }

    /// Resolve a typed name: surrounding whitespace and case are ignored.
    pub fn find_by_name(&self, name: &str) -> Option<&Substance> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.substances
            .iter()
            .find(|s| s.name.trim().to_lowercase() == wanted)
    }

    /// Pairs of substances that read identically on every reagent in the panel.
    ///
    /// Such pairs are legitimate; no sequence of guesses can tell them apart.
    pub fn indistinguishable_pairs(&self) -> Vec<(&Substance, &Substance)> {
        let mut pairs = Vec::new();
        for (i, a) in self.substances.iter().enumerate() {
            for b in &self.substances[i + 1..] {
                let same = self
                    .reagents
                    .iter()
                    .all(|r| a.outcome(&r.id) == b.outcome(&r.id));
                if same {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }
}
