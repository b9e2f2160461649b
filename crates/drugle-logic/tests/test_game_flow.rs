//! Integration tests for the engine end to end.
//!
//! Exercises: Dataset → compare / find_confusable → draw_round → Session
//!
//! All tests are pure logic with scripted or seeded random sources.

use std::sync::Arc;

use drugle_logic::compare::{compare, is_solved, MatchClass};
use drugle_logic::config::GameConfig;
use drugle_logic::confusable::{draw_round, find_confusable};
use drugle_logic::dataset::{Dataset, Substance, NO_REACTION};
use drugle_logic::rng::{RngSource, ScriptedSource};
use drugle_logic::session::{GameStatus, GuessError, Session};

// ── Helpers ────────────────────────────────────────────────────────────

fn builtin() -> Arc<Dataset> {
    Arc::new(Dataset::builtin().expect("bundled dataset"))
}

fn scenario() -> (Substance, Substance, Substance) {
    let a = Substance::new("a", "A")
        .with_reaction("marquis", "Orange")
        .with_reaction("mecke", "Brown");
    let b = Substance::new("b", "B")
        .with_reaction("marquis", "Orange")
        .with_reaction("mecke", "Black");
    let c = Substance::new("c", "C")
        .with_reaction("marquis", NO_REACTION)
        .with_reaction("mecke", "Brown");
    (a, b, c)
}

// ── Comparator properties over the whole catalogue ─────────────────────

#[test]
fn classification_rules_hold_for_every_pair() {
    let ds = builtin();
    let panel = ds.reagent_ids();
    for target in ds.substances() {
        for guess in ds.substances() {
            let results = compare(target, guess, panel.as_slice());
            assert_eq!(results.len(), panel.len());
            for (r, id) in results.iter().zip(&panel) {
                assert_eq!(&r.reagent_id, id);
                let (t, g) = (target.outcome(id), guess.outcome(id));
                let expected = if t == g {
                    MatchClass::Exact
                } else if t != NO_REACTION && g != NO_REACTION {
                    MatchClass::Present
                } else {
                    MatchClass::Absent
                };
                assert_eq!(r.class, expected, "{} vs {} on {id}", target.id, guess.id);
            }
        }
    }
}

#[test]
fn comparison_is_symmetric_and_reflexive() {
    let ds = builtin();
    let panel = ds.reagent_ids();
    for x in ds.substances() {
        assert!(is_solved(&compare(x, x, panel.as_slice())));
        for y in ds.substances() {
            assert_eq!(compare(x, y, panel.as_slice()), compare(y, x, panel.as_slice()));
        }
    }
}

#[test]
fn worked_scenarios() {
    let (a, b, c) = scenario();
    let ab: Vec<_> = compare(&a, &b, &["marquis", "mecke"])
        .into_iter()
        .map(|r| r.class)
        .collect();
    assert_eq!(ab, [MatchClass::Exact, MatchClass::Present]);

    let ac: Vec<_> = compare(&a, &c, &["marquis", "mecke"])
        .into_iter()
        .map(|r| r.class)
        .collect();
    assert_eq!(ac, [MatchClass::Absent, MatchClass::Exact]);

    let catalogue = vec![a.clone(), b, c];
    let found: Vec<_> = find_confusable(&a, &catalogue, 1)
        .into_iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(found, ["b", "c"]);
    assert!(find_confusable(&a, &catalogue, 2).is_empty());
}

// ── Round draws ────────────────────────────────────────────────────────

#[test]
fn seeded_draws_respect_probability_endpoints() {
    let ds = builtin();
    let cat = ds.substances();
    let mut rng = RngSource::seeded(42);
    for _ in 0..200 {
        let round = draw_round(cat, 1, 0.0, &mut rng).unwrap();
        assert!(!round.is_decoy());

        let round = draw_round(cat, 1, 1.0, &mut rng).unwrap();
        let decoys = find_confusable(round.label, cat, 1);
        if decoys.is_empty() {
            assert!(!round.is_decoy());
        } else {
            assert!(round.is_decoy());
            assert!(decoys.iter().any(|d| d.id == round.ground_truth.id));
        }
    }
}

#[test]
fn every_substance_can_be_drawn() {
    let ds = builtin();
    let cat = ds.substances();
    let n = cat.len();
    for (i, s) in cat.iter().enumerate() {
        let v = (i as f64 + 0.5) / n as f64;
        let round = draw_round(cat, 1, 0.0, &mut ScriptedSource::new(vec![v])).unwrap();
        assert_eq!(round.label.id, s.id);
    }
}

// ── Full sessions ──────────────────────────────────────────────────────

#[test]
fn deduction_by_elimination_finds_target() {
    // Guess candidates in catalogue order, skipping any that contradict the
    // feedback seen so far. Must win within the attempt budget for
    // distinguishable targets.
    let ds = builtin();
    let n = ds.substances().len();
    let ambiguous: Vec<String> = ds
        .indistinguishable_pairs()
        .iter()
        .flat_map(|(a, b)| [a.id.clone(), b.id.clone()])
        .collect();

    for (i, target) in ds.substances().iter().enumerate() {
        if ambiguous.contains(&target.id) {
            continue;
        }
        let rng = ScriptedSource::new(vec![(i as f64 + 0.5) / n as f64, 0.99]);
        let config = GameConfig {
            max_attempts: n as u32,
            ..GameConfig::classic()
        };
        let mut session = Session::new(ds.clone(), config, rng).unwrap();
        let panel = session.reagent_ids().to_vec();

        for candidate in ds.substances() {
            if session.is_over() {
                break;
            }
            let consistent = session
                .history()
                .iter()
                .all(|g| compare(candidate, &g.substance, panel.as_slice()) == g.results);
            if consistent {
                session.submit_guess(&candidate.name).unwrap();
            }
        }
        assert_eq!(session.status(), GameStatus::Won, "target {}", target.id);
    }
}

#[test]
fn invalid_guesses_never_cost_attempts() {
    let ds = builtin();
    let mut session = Session::new(ds, GameConfig::classic(), RngSource::seeded(3)).unwrap();
    for bad in ["", "water", "MDMA!", "m d m a"] {
        assert!(session.submit_guess(bad).is_err());
    }
    assert_eq!(session.attempts(), 0);
    assert_eq!(session.attempts_remaining(), 6);
}

#[test]
fn lost_round_then_new_round() {
    let ds = builtin();
    let cat_len = ds.substances().len();
    let config = GameConfig {
        max_attempts: 1,
        ..GameConfig::classic()
    };
    // target caffeine (last), guess something else
    let rng = ScriptedSource::new(vec![(cat_len as f64 - 0.5) / cat_len as f64, 0.99]);
    let mut session = Session::new(ds, config, rng).unwrap();
    session.submit_guess("MDMA").unwrap();
    assert_eq!(session.status(), GameStatus::Lost);
    assert_eq!(session.submit_guess("MDA"), Err(GuessError::RoundOver));

    session.new_round().unwrap();
    assert_eq!(session.status(), GameStatus::InProgress);
    assert!(session.history().is_empty());
    session.submit_guess("Caffeine").unwrap();
    assert_eq!(session.status(), GameStatus::Won);
}

#[test]
fn guess_records_serialize_for_presentation() {
    let ds = builtin();
    let rng = ScriptedSource::new(vec![0.0]);
    let mut session = Session::new(ds, GameConfig::classic(), rng).unwrap();
    let record = session.submit_guess("MDA").unwrap();
    let json = serde_json::to_value(record).unwrap();
    assert_eq!(json["substance"]["id"], "mda");
    assert_eq!(json["results"][0]["reagentId"], "marquis");
    assert_eq!(json["results"][0]["match"], "exact");
    assert_eq!(json["results"][5]["match"], "absent");
}
