//! Pure game logic for Drugle.
//!
//! This crate contains the decision logic of the reagent-testing deduction
//! game, independent of any UI or runtime. Functions take plain data and
//! return results; randomness is always injected, so every probability gate
//! can be forced from a test.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chart`] | Reference color chart rows and display color families |
//! | [`compare`] | Per-reagent exact / present / absent classification |
//! | [`config`] | Game options (attempts, decoy threshold, decoy probability) |
//! | [`confusable`] | Decoy search and label/ground-truth round draws |
//! | [`dataset`] | Reagent panel and substance catalogue, load-time validation |
//! | [`rng`] | Injectable uniform `[0, 1)` random sources |
//! | [`session`] | Guessing game controller (history, attempts, win/loss) |
//! | [`simulator`] | Test-kit mode: apply reagents, read outcomes, submit analysis |

pub mod chart;
pub mod compare;
pub mod config;
pub mod confusable;
pub mod dataset;
pub mod rng;
pub mod session;
pub mod simulator;
