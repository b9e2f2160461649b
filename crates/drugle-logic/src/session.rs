//! Guessing game controller.
//!
//! A [`Session`] owns everything that changes during play: the current
//! sample, the guess history, and the win/loss state. The dataset is shared
//! read-only; each concurrent game gets its own `Session`.
//!
//! # Round Flow
//!
//! 1. A sample is drawn through [`draw_round`] (training configs may
//!    mislabel it)
//! 2. The player submits substance names; unknown names are rejected
//!    without consuming an attempt
//! 3. Each accepted guess is compared against the ground truth on the full
//!    reagent panel and appended to the history
//! 4. Naming the ground truth wins; running out of attempts loses
//!
//! ```
//! use std::sync::Arc;
//! use drugle_logic::config::GameConfig;
//! use drugle_logic::dataset::Dataset;
//! use drugle_logic::rng::ScriptedSource;
//! use drugle_logic::session::{GameStatus, Session};
//!
//! let dataset = Arc::new(Dataset::builtin().unwrap());
//! let rng = ScriptedSource::new(vec![0.0]);
//! let mut session = Session::new(dataset, GameConfig::classic(), rng).unwrap();
//! let target = session.sample().label.name.clone();
//! session.submit_guess(&target).unwrap();
//! assert_eq!(session.status(), GameStatus::Won);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::compare::{compare, ReagentMatch};
use crate::config::{ConfigError, GameConfig};
use crate::confusable::{draw_round, Sample};
use crate::dataset::{Dataset, Substance};
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// One submitted guess and its per-reagent feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub substance: Substance,
    pub results: Vec<ReagentMatch>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("dataset has no substances to draw from")]
    EmptyCatalogue,
}

/// Rejected guesses. None of them consume an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("no guess entered")]
    EmptyGuess,

    #[error("invalid substance: {0}")]
    UnknownSubstance(String),

    #[error("the round is already over")]
    RoundOver,
}

pub struct Session<R> {
    dataset: Arc<Dataset>,
    config: GameConfig,
    rng: R,
    reagent_ids: Vec<String>,
    sample: Sample,
    history: Vec<GuessRecord>,
    status: GameStatus,
}

impl<R: RandomSource> Session<R> {
    /// Validate `config` and draw the first sample.
    pub fn new(
        dataset: Arc<Dataset>,
        config: GameConfig,
        mut rng: R,
    ) -> Result<Self, SessionError> {
        let config = config.validated()?;
        let reagent_ids = dataset.reagent_ids();
        log::info!(
            "Session started: {} substances, {} reagents, max {} attempts",
            dataset.substances().len(),
            reagent_ids.len(),
            config.max_attempts
        );
        let sample = draw_sample(&dataset, &config, &mut rng)?;
        Ok(Self {
            dataset,
            config,
            rng,
            reagent_ids,
            sample,
            history: Vec::new(),
            status: GameStatus::InProgress,
        })
    }

    /// Discard the history and draw a fresh sample.
    pub fn new_round(&mut self) -> Result<(), SessionError> {
        self.sample = draw_sample(&self.dataset, &self.config, &mut self.rng)?;
        self.history.clear();
        self.status = GameStatus::InProgress;
        Ok(())
    }

    /// Resolve a typed name and score it against the ground truth.
    pub fn submit_guess(&mut self, name: &str) -> Result<&GuessRecord, GuessError> {
        if self.status != GameStatus::InProgress {
            return Err(GuessError::RoundOver);
        }
        if name.trim().is_empty() {
            return Err(GuessError::EmptyGuess);
        }
        let Some(guess) = self.dataset.find_by_name(name) else {
            log::warn!("Rejected guess {:?}: not in catalogue", name);
            return Err(GuessError::UnknownSubstance(name.trim().to_string()));
        };

        let truth = &self.sample.ground_truth;
        let record = GuessRecord {
            substance: guess.clone(),
            results: compare(truth, guess, self.reagent_ids.as_slice()),
        };

        if guess.id == truth.id {
            self.status = GameStatus::Won;
            log::info!("Round won in {} guess(es)", self.history.len() + 1);
        } else if self.history.len() + 1 >= self.config.max_attempts as usize {
            self.status = GameStatus::Lost;
            log::info!("Round lost: the substance was {}", truth.name);
        }

        self.history.push(record);
        Ok(&self.history[self.history.len() - 1])
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    /// Guesses consumed this round.
    pub fn attempts(&self) -> u32 {
        self.history.len() as u32
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.config.max_attempts.saturating_sub(self.attempts())
    }

    /// The current sample. `label` is safe to show; `ground_truth` is the answer.
    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// The answer, once the round has ended.
    pub fn revealed_answer(&self) -> Option<&Substance> {
        self.is_over().then_some(&self.sample.ground_truth)
    }

    /// Reagent panel used for every guess, in display order.
    pub fn reagent_ids(&self) -> &[String] {
        &self.reagent_ids
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

/// Draw a round from the catalogue using the configured decoy settings.
pub(crate) fn draw_sample<R: RandomSource>(
    dataset: &Dataset,
    config: &GameConfig,
    rng: &mut R,
) -> Result<Sample, SessionError> {
    let round = draw_round(
        dataset.substances(),
        config.confusability_threshold,
        config.decoy_probability,
        rng,
    )
    .ok_or(SessionError::EmptyCatalogue)?;
    log::info!("New round: sample labelled {}", round.label.name);
    log::debug!(
        "Ground truth is {} (decoy: {})",
        round.ground_truth.name,
        round.is_decoy()
    );
    Ok(round.to_sample())
}
