//! Test-kit simulator.
//!
//! The player is handed a labelled sample, applies reagents one at a time,
//! reads the resulting colors, and submits an analysis naming the substance.
//! Samples are drawn with [`draw_round`](crate::confusable::draw_round), so
//! a training configuration can hand out a mislabeled sample whose colors
//! belong to a similar substance.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::GameConfig;
use crate::confusable::Sample;
use crate::dataset::{Dataset, Substance};
use crate::rng::RandomSource;
use crate::session::{draw_sample, SessionError};

/// The color a reagent produced on the current sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub reagent_id: String,
    pub reagent_name: String,
    pub outcome: String,
}

/// Result of a submitted analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    /// The substance the player named.
    pub named: Substance,
    /// The substance whose reactions were shown.
    pub answer: Substance,
    /// True when the sample label differed from the answer.
    pub mislabeled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("unknown reagent: {0}")]
    UnknownReagent(String),

    #[error("please select a substance before submitting")]
    NothingSelected,

    #[error("unknown substance: {0}")]
    UnknownSubstance(String),

    #[error("this sample has already been analysed")]
    AlreadySubmitted,
}

pub struct Simulator<R> {
    dataset: Arc<Dataset>,
    config: GameConfig,
    rng: R,
    sample: Sample,
    applied: Vec<String>,
    verdict: Option<Verdict>,
}

impl<R: RandomSource> Simulator<R> {
    pub fn new(
        dataset: Arc<Dataset>,
        config: GameConfig,
        mut rng: R,
    ) -> Result<Self, SessionError> {
        let config = config.validated()?;
        let sample = draw_sample(&dataset, &config, &mut rng)?;
        Ok(Self {
            dataset,
            config,
            rng,
            sample,
            applied: Vec::new(),
            verdict: None,
        })
    }

    /// Throw away selections and the verdict, and draw another sample.
    pub fn new_sample(&mut self) -> Result<(), SessionError> {
        self.sample = draw_sample(&self.dataset, &self.config, &mut self.rng)?;
        self.applied.clear();
        self.verdict = None;
        Ok(())
    }

    /// Name shown on the sample vial.
    pub fn label(&self) -> &str {
        &self.sample.label.name
    }

    /// Apply a reagent, or remove it if already applied. Returns whether the
    /// reagent is applied afterwards.
    pub fn toggle_reagent(&mut self, reagent_id: &str) -> Result<bool, AnalysisError> {
        if self.dataset.reagent(reagent_id).is_none() {
            return Err(AnalysisError::UnknownReagent(reagent_id.to_string()));
        }
        if let Some(pos) = self.applied.iter().position(|id| id == reagent_id) {
            self.applied.remove(pos);
            Ok(false)
        } else {
            self.applied.push(reagent_id.to_string());
            Ok(true)
        }
    }

    /// Reagent ids applied so far, in application order.
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Colors observed for every applied reagent, read from the ground truth.
    pub fn observations(&self) -> Vec<Observation> {
        self.applied
            .iter()
            .filter_map(|id| {
                let reagent = self.dataset.reagent(id)?;
                Some(Observation {
                    reagent_id: reagent.id.clone(),
                    reagent_name: reagent.name.clone(),
                    outcome: self.sample.ground_truth.outcome(id).to_string(),
                })
            })
            .collect()
    }

    /// Submit the analysis. `substance_id` is `None` when nothing is selected.
    pub fn submit(&mut self, substance_id: Option<&str>) -> Result<&Verdict, AnalysisError> {
        if self.verdict.is_some() {
            return Err(AnalysisError::AlreadySubmitted);
        }
        let id = substance_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AnalysisError::NothingSelected)?;
        let named = self
            .dataset
            .substance(id)
            .ok_or_else(|| AnalysisError::UnknownSubstance(id.to_string()))?;

        let answer = &self.sample.ground_truth;
        let correct = named.id == answer.id;
        log::info!(
            "Analysis submitted: named {}, answer {} ({})",
            named.name,
            answer.name,
            if correct { "correct" } else { "incorrect" }
        );

        let verdict = Verdict {
            correct,
            named: named.clone(),
            answer: answer.clone(),
            mislabeled: self.sample.is_decoy(),
        };
        Ok(&*self.verdict.insert(verdict))
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }
}
