//! Drugle Headless Simulation Harness
//!
//! Validates the reference dataset and the game engine without any UI.
//! Runs entirely in-process: no rendering, no input, no persistence.
//!
//! Usage:
//!   cargo run -p drugle-simtest
//!   cargo run -p drugle-simtest -- --verbose
//!   cargo run -p drugle-simtest -- --dataset path/to/dataset.json --seed 7

use std::sync::Arc;

use drugle_logic::chart::{build_chart, ColorFamily};
use drugle_logic::compare::{compare, is_solved, tally, MatchClass};
use drugle_logic::config::GameConfig;
use drugle_logic::confusable::{draw_round, find_confusable};
use drugle_logic::dataset::{Dataset, NO_DATA, NO_REACTION};
use drugle_logic::rng::{RngSource, ScriptedSource};
use drugle_logic::session::{GameStatus, Session};
use drugle_logic::simulator::Simulator;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    dataset_path: Option<String>,
    seed: u64,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        dataset_path: value_of("--dataset"),
        seed: value_of("--seed")
            .and_then(|s| s.parse().ok())
            .unwrap_or(42),
    }
}

fn load_dataset(path: Option<&str>) -> Result<Dataset, String> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path, e))?;
            Dataset::from_json(&json).map_err(|e| e.to_string())
        }
        None => Dataset::builtin().map_err(|e| e.to_string()),
    }
}

fn main() {
    let opts = parse_args();
    println!("=== Drugle Engine Harness ===\n");

    let dataset = match load_dataset(opts.dataset_path.as_deref()) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            println!("  ✗ dataset_load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Dataset shape
    results.extend(validate_dataset(&dataset, opts.verbose));

    // 2. Comparator rules over every pair
    results.extend(validate_comparator(&dataset, opts.verbose));

    // 3. Confusability sweep
    results.extend(validate_confusability(&dataset, opts.verbose));

    // 4. Round draws
    results.extend(validate_draws(&dataset, opts.seed, opts.verbose));

    // 5. Scripted sessions
    results.extend(validate_sessions(&dataset, opts.verbose));

    // 6. Simulator mode
    results.extend(validate_simulator(&dataset, opts.seed, opts.verbose));

    // 7. Color chart
    results.extend(validate_chart(&dataset, opts.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Dataset ──────────────────────────────────────────────────────────

fn validate_dataset(dataset: &Dataset, verbose: bool) -> Vec<TestResult> {
    println!("--- Dataset ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "dataset_reagents".into(),
        passed: !dataset.reagents().is_empty(),
        detail: format!("{} reagents in panel", dataset.reagents().len()),
    });

    results.push(TestResult {
        name: "dataset_substances".into(),
        passed: dataset.substances().len() >= 2,
        detail: format!("{} substances in catalogue", dataset.substances().len()),
    });

    // Every substance must react with at least one reagent, or it can
    // only ever be guessed blind
    let inert: Vec<_> = dataset
        .substances()
        .iter()
        .filter(|s| s.reactions.values().all(|o| o == NO_REACTION))
        .map(|s| s.name.as_str())
        .collect();
    results.push(TestResult {
        name: "dataset_inert_substances".into(),
        passed: inert.len() <= 1,
        detail: if inert.is_empty() {
            "every substance reacts with something".into()
        } else {
            format!("inert: {}", inert.join(", "))
        },
    });

    if verbose {
        let pairs: Vec<_> = dataset
            .indistinguishable_pairs()
            .iter()
            .map(|(a, b)| format!("{} = {}", a.name, b.name))
            .collect();
        if pairs.is_empty() {
            println!("  Every substance has a unique reaction profile");
        } else {
            println!("  Indistinguishable: {}", pairs.join(", "));
        }
        let partial: Vec<_> = dataset
            .substances()
            .iter()
            .filter(|s| s.reactions.len() < dataset.reagents().len())
            .map(|s| format!("{} ({}/{})", s.name, s.reactions.len(), dataset.reagents().len()))
            .collect();
        println!("  Partial reaction data: {}", partial.join(", "));
    }

    results
}

// ── 2. Comparator ───────────────────────────────────────────────────────

fn validate_comparator(dataset: &Dataset, verbose: bool) -> Vec<TestResult> {
    println!("--- Reaction Comparator ---");
    let mut results = Vec::new();
    let panel = dataset.reagent_ids();

    let mut reflexive_failures = 0;
    let mut symmetric_failures = 0;
    let mut rule_failures = 0;
    let mut counts = [0usize; 3];

    for x in dataset.substances() {
        if !is_solved(&compare(x, x, panel.as_slice())) {
            reflexive_failures += 1;
        }
        for y in dataset.substances() {
            let xy = compare(x, y, panel.as_slice());
            if xy != compare(y, x, panel.as_slice()) {
                symmetric_failures += 1;
            }
            for r in &xy {
                let (t, g) = (x.outcome(&r.reagent_id), y.outcome(&r.reagent_id));
                let ok = match r.class {
                    MatchClass::Exact => t == g,
                    MatchClass::Present => t != g && t != NO_REACTION && g != NO_REACTION,
                    MatchClass::Absent => t != g && (t == NO_REACTION || g == NO_REACTION),
                };
                if !ok {
                    rule_failures += 1;
                }
            }
            let t = tally(&xy);
            counts[0] += t.exact;
            counts[1] += t.present;
            counts[2] += t.absent;
        }
    }

    results.push(TestResult {
        name: "compare_reflexive".into(),
        passed: reflexive_failures == 0,
        detail: format!("{} substances fail self-comparison", reflexive_failures),
    });
    results.push(TestResult {
        name: "compare_symmetric".into(),
        passed: symmetric_failures == 0,
        detail: format!("{} asymmetric pairs", symmetric_failures),
    });
    results.push(TestResult {
        name: "compare_rules".into(),
        passed: rule_failures == 0,
        detail: format!("{} cells violate the classification rules", rule_failures),
    });

    // Every feedback color should actually occur, or the puzzle loses a signal
    results.push(TestResult {
        name: "compare_all_classes_used".into(),
        passed: counts.iter().all(|&c| c > 0),
        detail: format!(
            "exact={} present={} absent={}",
            counts[0], counts[1], counts[2]
        ),
    });

    if verbose {
        println!(
            "  Feedback distribution over {} pairs: exact={} present={} absent={}",
            dataset.substances().len().pow(2),
            counts[0],
            counts[1],
            counts[2]
        );
    }

    results
}

// ── 3. Confusability ────────────────────────────────────────────────────

fn validate_confusability(dataset: &Dataset, verbose: bool) -> Vec<TestResult> {
    println!("--- Confusability Selector ---");
    let mut results = Vec::new();
    let cat = dataset.substances();
    let max_t = dataset.reagents().len() + 1;

    let self_included = cat
        .iter()
        .filter(|s| (1..=max_t).any(|t| find_confusable(s, cat, t).iter().any(|c| c.id == s.id)))
        .count();
    results.push(TestResult {
        name: "confusable_excludes_self".into(),
        passed: self_included == 0,
        detail: format!("{} substances list themselves", self_included),
    });

    let mut non_monotonic = 0;
    for s in cat {
        for t in 1..max_t {
            let looser = find_confusable(s, cat, t);
            let tighter = find_confusable(s, cat, t + 1);
            if !tighter.iter().all(|x| looser.iter().any(|y| y.id == x.id)) {
                non_monotonic += 1;
            }
        }
    }
    results.push(TestResult {
        name: "confusable_monotonic".into(),
        passed: non_monotonic == 0,
        detail: format!("{} threshold steps grow the set", non_monotonic),
    });

    // Training mode needs at least one label with a decoy at the default threshold
    let coverage = |t: usize| {
        cat.iter()
            .filter(|s| !find_confusable(s, cat, t).is_empty())
            .count()
    };
    let default_threshold = GameConfig::default().confusability_threshold;
    let with_decoy = coverage(default_threshold);
    results.push(TestResult {
        name: "confusable_training_possible".into(),
        passed: with_decoy > 0,
        detail: format!(
            "{}/{} substances have a decoy at threshold {}",
            with_decoy,
            cat.len(),
            default_threshold
        ),
    });

    if verbose {
        for t in 1..=3 {
            println!("  Coverage at threshold {}: {}/{}", t, coverage(t), cat.len());
        }
        println!("  Decoys at threshold 2:");
        for s in cat {
            let names: Vec<_> = find_confusable(s, cat, 2)
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            println!("    {:16} {}", s.name, names.join(", "));
        }
    }

    results
}

// ── 4. Round draws ──────────────────────────────────────────────────────

fn validate_draws(dataset: &Dataset, seed: u64, _verbose: bool) -> Vec<TestResult> {
    println!("--- Round Draws ---");
    let mut results = Vec::new();
    let cat = dataset.substances();
    let mut rng = RngSource::seeded(seed);
    let rounds = 1000;

    let honest_decoys = (0..rounds)
        .filter(|_| {
            draw_round(cat, 1, 0.0, &mut rng)
                .map(|r| r.is_decoy())
                .unwrap_or(true)
        })
        .count();
    results.push(TestResult {
        name: "draw_p0_never_decoys".into(),
        passed: honest_decoys == 0,
        detail: format!("{} of {} rounds mislabeled at p=0", honest_decoys, rounds),
    });

    let mut forced_misses = 0;
    for _ in 0..rounds {
        if let Some(round) = draw_round(cat, 1, 1.0, &mut rng) {
            let has_decoy = !find_confusable(round.label, cat, 1).is_empty();
            if has_decoy != round.is_decoy() {
                forced_misses += 1;
            }
        }
    }
    results.push(TestResult {
        name: "draw_p1_always_decoys".into(),
        passed: forced_misses == 0,
        detail: format!("{} of {} rounds ignored an available decoy", forced_misses, rounds),
    });

    let mixed = (0..rounds)
        .filter_map(|_| draw_round(cat, 1, 0.5, &mut rng))
        .filter(|r| r.is_decoy())
        .count();
    let rate = mixed as f64 / rounds as f64;
    results.push(TestResult {
        name: "draw_p_half_rate".into(),
        passed: (0.25..=0.6).contains(&rate),
        detail: format!("decoy rate {:.3} at p=0.5 (seed {})", rate, seed),
    });

    let empty = draw_round(&[], 1, 1.0, &mut rng).is_none();
    results.push(TestResult {
        name: "draw_empty_catalogue".into(),
        passed: empty,
        detail: "empty catalogue yields no round".into(),
    });

    results
}

// ── 5. Sessions ─────────────────────────────────────────────────────────

fn validate_sessions(dataset: &Arc<Dataset>, verbose: bool) -> Vec<TestResult> {
    println!("--- Game Sessions ---");
    let mut results = Vec::new();
    let n = dataset.substances().len();
    let pick = |i: usize| (i as f64 + 0.5) / n as f64;

    // Immediate win on every target
    let mut instant_wins = 0;
    for (i, target) in dataset.substances().iter().enumerate() {
        let rng = ScriptedSource::new(vec![pick(i), 0.99]);
        if let Ok(mut session) = Session::new(dataset.clone(), GameConfig::classic(), rng) {
            if session.submit_guess(&target.name).is_ok() && session.status() == GameStatus::Won {
                instant_wins += 1;
            }
        }
    }
    results.push(TestResult {
        name: "session_instant_win".into(),
        passed: instant_wins == n,
        detail: format!("{}/{} targets won on first guess", instant_wins, n),
    });

    // Invalid guesses are free
    let rng = ScriptedSource::new(vec![pick(0), 0.99]);
    let free = match Session::new(dataset.clone(), GameConfig::classic(), rng) {
        Ok(mut session) => {
            let rejected = ["", "not a drug", "???"]
                .iter()
                .all(|g| session.submit_guess(g).is_err());
            rejected && session.attempts() == 0
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "session_invalid_guess_free".into(),
        passed: free,
        detail: "invalid guesses consume no attempts".into(),
    });

    // Elimination strategy: guess only candidates consistent with feedback
    let panel = dataset.reagent_ids();
    let mut guess_counts = Vec::new();
    let mut losses = Vec::new();
    for (i, target) in dataset.substances().iter().enumerate() {
        let rng = ScriptedSource::new(vec![pick(i), 0.99]);
        let config = GameConfig {
            max_attempts: n as u32,
            ..GameConfig::classic()
        };
        let Ok(mut session) = Session::new(dataset.clone(), config, rng) else {
            losses.push(target.name.clone());
            continue;
        };
        for candidate in dataset.substances() {
            if session.is_over() {
                break;
            }
            let consistent = session
                .history()
                .iter()
                .all(|g| compare(candidate, &g.substance, panel.as_slice()) == g.results);
            if consistent && session.submit_guess(&candidate.name).is_err() {
                break;
            }
        }
        match session.status() {
            GameStatus::Won => guess_counts.push(session.attempts()),
            _ => losses.push(target.name.clone()),
        }
    }
    let ambiguous = dataset.indistinguishable_pairs().len();
    results.push(TestResult {
        name: "session_elimination_strategy".into(),
        passed: losses.len() <= ambiguous,
        detail: format!(
            "won {}/{} (lost: {})",
            guess_counts.len(),
            n,
            if losses.is_empty() {
                "none".to_string()
            } else {
                losses.join(", ")
            }
        ),
    });

    if verbose && !guess_counts.is_empty() {
        let avg = guess_counts.iter().sum::<u32>() as f64 / guess_counts.len() as f64;
        println!("  Elimination strategy average: {:.2} guesses", avg);
        let rng = ScriptedSource::new(vec![pick(0), 0.99]);
        if let Ok(mut session) = Session::new(dataset.clone(), GameConfig::classic(), rng) {
            if let Some(other) = dataset.substances().get(1) {
                if let Ok(record) = session.submit_guess(&other.name) {
                    if let Ok(json) = serde_json::to_string(record) {
                        println!("  Sample guess record: {}", json);
                    }
                }
            }
        }
    }

    results
}

// ── 6. Simulator ────────────────────────────────────────────────────────

fn validate_simulator(dataset: &Arc<Dataset>, seed: u64, _verbose: bool) -> Vec<TestResult> {
    println!("--- Reagent Simulator ---");
    let mut results = Vec::new();

    let config = GameConfig::training(1);
    let mut sim = match Simulator::new(dataset.clone(), config, RngSource::seeded(seed)) {
        Ok(sim) => sim,
        Err(e) => {
            results.push(TestResult {
                name: "simulator_start".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let mut correct = 0;
    let mut mislabeled = 0;
    let mut toggle_failures = 0;
    let samples = 100;
    for _ in 0..samples {
        for reagent in dataset.reagents() {
            if !matches!(sim.toggle_reagent(&reagent.id), Ok(true)) {
                toggle_failures += 1;
            }
        }
        // Identify by matching the full observation set
        let observed: Vec<String> = sim.observations().into_iter().map(|o| o.outcome).collect();
        let named = dataset
            .substances()
            .iter()
            .find(|s| {
                dataset
                    .reagents()
                    .iter()
                    .zip(&observed)
                    .all(|(r, o)| s.outcome(&r.id) == o)
            })
            .map(|s| s.id.clone());
        if let Ok(verdict) = sim.submit(named.as_deref()) {
            if verdict.correct {
                correct += 1;
            }
            if verdict.mislabeled {
                mislabeled += 1;
            }
        }
        if sim.new_sample().is_err() {
            break;
        }
    }

    results.push(TestResult {
        name: "simulator_apply_every_reagent".into(),
        passed: toggle_failures == 0,
        detail: format!("{} reagent applications failed", toggle_failures),
    });

    let ambiguous = !dataset.indistinguishable_pairs().is_empty();
    results.push(TestResult {
        name: "simulator_full_panel_identifies".into(),
        passed: correct == samples || (ambiguous && correct * 4 >= samples * 3),
        detail: format!("{}/{} analyses correct", correct, samples),
    });
    results.push(TestResult {
        name: "simulator_training_mislabels".into(),
        passed: mislabeled > 0,
        detail: format!("{}/{} samples mislabeled", mislabeled, samples),
    });

    results
}

// ── 7. Color chart ──────────────────────────────────────────────────────

fn validate_chart(dataset: &Dataset, verbose: bool) -> Vec<TestResult> {
    println!("--- Color Chart ---");
    let mut results = Vec::new();
    let chart = build_chart(dataset);

    let complete = chart
        .iter()
        .all(|row| row.cells.len() == dataset.reagents().len());
    results.push(TestResult {
        name: "chart_complete_rows".into(),
        passed: chart.len() == dataset.substances().len() && complete,
        detail: format!("{} rows x {} reagents", chart.len(), dataset.reagents().len()),
    });

    // Sentinel outcomes must render as their own family, never as a color
    let cells: Vec<_> = chart.iter().flat_map(|row| row.cells.iter()).collect();
    let mis_rendered = cells
        .iter()
        .filter(|c| match c.outcome.as_str() {
            NO_REACTION => c.families != [ColorFamily::NoReaction],
            NO_DATA => c.families != [ColorFamily::NoData],
            _ => c.families.is_empty(),
        })
        .count();
    results.push(TestResult {
        name: "chart_cell_families".into(),
        passed: mis_rendered == 0,
        detail: format!("{}/{} cells rendered wrongly", mis_rendered, cells.len()),
    });

    if verbose {
        let other = cells
            .iter()
            .filter(|c| c.families.contains(&ColorFamily::Other))
            .count();
        println!("  {} cells fall back to Other", other);
        for row in &chart {
            let cells: Vec<_> = row.cells.iter().map(|c| c.outcome.as_str()).collect();
            println!("    {:16} {}", row.substance_name, cells.join(" | "));
        }
    }

    results
}
