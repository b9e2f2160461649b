//! Game options and their validation.
//!
//! Every field has a safe default, so a partial JSON document (or none at
//! all) yields a playable configuration:
//!
//! ```
//! use drugle_logic::config::{validate_config, GameConfig};
//!
//! let config = GameConfig::from_json(r#"{ "maxAttempts": 8 }"#).unwrap();
//! assert_eq!(config.max_attempts, 8);
//! assert_eq!(config.decoy_probability, 0.5);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Guesses allowed before a round is lost.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Smallest meaningful decoy threshold. Modes that want a stricter decoy
/// pin their own value through [`GameConfig::training`].
pub const DEFAULT_CONFUSABILITY_THRESHOLD: usize = 1;

/// Chance that a round shows a mislabeled sample.
pub const DEFAULT_DECOY_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub max_attempts: u32,
    /// Minimum identical reagent outcomes for a substance to serve as a decoy.
    pub confusability_threshold: usize,
    /// Probability in `[0, 1]` that the label and ground truth differ.
    pub decoy_probability: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            confusability_threshold: DEFAULT_CONFUSABILITY_THRESHOLD,
            decoy_probability: DEFAULT_DECOY_PROBABILITY,
        }
    }
}

impl GameConfig {
    /// Plain guessing game: the label is always the truth.
    pub fn classic() -> Self {
        Self {
            decoy_probability: 0.0,
            ..Self::default()
        }
    }

    /// Training variant with mislabeled samples at the given threshold.
    pub fn training(confusability_threshold: usize) -> Self {
        Self {
            confusability_threshold,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Return `self` if [`validate_config`] finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let issues = validate_config(&self);
        if issues.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid { issues })
        }
    }
}

/// A single problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("confusability_threshold must be at least 1")]
    ZeroThreshold,
    #[error("decoy_probability {0} is outside [0, 1]")]
    DecoyProbabilityOutOfRange(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {issues:?}")]
    Invalid { issues: Vec<ConfigIssue> },
}

/// Validate a configuration, returning all issues found.
pub fn validate_config(config: &GameConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if config.max_attempts == 0 {
        issues.push(ConfigIssue::ZeroAttempts);
    }
    if config.confusability_threshold == 0 {
        issues.push(ConfigIssue::ZeroThreshold);
    }
    if !(0.0..=1.0).contains(&config.decoy_probability) {
        issues.push(ConfigIssue::DecoyProbabilityOutOfRange(
            config.decoy_probability,
        ));
    }

    issues
}
