use playforge::alphabet::Alphabet;
use playforge::api::{self, AnalysisInput};
use playforge::cipher::{Decryptor, FillerRule};
use playforge::config::Config;
use playforge::key::Key;
use playforge::optimizer::{
    BestResult, Progress, ProgressCallback, SearchEvent, SearchOutcome, StopSignal,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

// "Hide the gold in the tree stump" under PLAYFAIREXAMPLE.
const CIPHERTEXT: &str = "BMODZBXDNABEKUDMUIXMMOUVIF";
const CRIB: &str = "HIDETHEGOLD";

fn config(cycles: usize, threads: usize, inner_steps: usize, seed: u64) -> Config {
    let mut cfg = Config::default();
    cfg.search.cycles = cycles;
    cfg.search.threads = threads;
    cfg.search.inner_steps = inner_steps;
    cfg.search.seed = Some(seed);
    cfg
}

fn input() -> AnalysisInput {
    AnalysisInput {
        ciphertext: CIPHERTEXT.to_string(),
        crib: Some(CRIB.to_string()),
        ngrams: None,
    }
}

fn solve(cfg: &Config) -> SearchOutcome {
    api::analyze(cfg, input(), &StopSignal::new(), &()).unwrap()
}

fn fingerprint(best: &Option<BestResult>) -> Option<(i64, String, String)> {
    best.as_ref()
        .map(|b| (b.score, b.key.clone(), b.plaintext.clone()))
}

#[test]
fn test_single_cycle_is_reproducible() {
    let cfg = config(1, 1, 20_000, 42);
    let first = solve(&cfg);
    let second = solve(&cfg);

    assert!(first.best.is_some());
    assert_eq!(fingerprint(&first.best), fingerprint(&second.best));
    assert_eq!(first.evaluations, second.evaluations);
}

#[test]
fn test_bounded_run_evaluates_planned_keys() {
    let cfg = config(3, 2, 1_000, 7);
    let outcome = solve(&cfg);

    assert_eq!(outcome.cycles_completed, 6);
    assert_eq!(Some(outcome.evaluations), api::max_keys(&cfg.search));
    assert!(!outcome.stopped);
}

#[test]
fn test_improvements_are_strictly_increasing() {
    let cfg = config(2, 4, 5_000, 11);
    let (tx, rx) = mpsc::channel();
    let outcome = api::analyze(&cfg, input(), &StopSignal::new(), &tx).unwrap();
    drop(tx);

    let mut scores = Vec::new();
    let mut progress_events = 0;
    for event in rx {
        match event {
            SearchEvent::Improvement(r) => scores.push(r.score),
            SearchEvent::Progress(_) => progress_events += 1,
        }
    }

    assert!(!scores.is_empty());
    assert!(scores.windows(2).all(|w| w[0] < w[1]), "{:?}", scores);
    assert_eq!(scores.last().copied(), outcome.best.as_ref().map(|b| b.score));
    assert_eq!(progress_events, 8);
}

#[test]
fn test_best_list_is_ranked() {
    let mut cfg = config(4, 2, 2_000, 5);
    cfg.search.best_list_size = 3;
    let outcome = solve(&cfg);

    assert!(!outcome.best_list.is_empty() && outcome.best_list.len() <= 3);
    assert!(outcome
        .best_list
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
    assert_eq!(
        outcome.best_list[0].score,
        outcome.best.as_ref().map(|b| b.score).unwrap_or_default()
    );

    let plaintexts: std::collections::HashSet<_> =
        outcome.best_list.iter().map(|e| &e.plaintext).collect();
    assert_eq!(plaintexts.len(), outcome.best_list.len());
}

#[test]
fn test_raised_stop_signal_prevents_work() {
    let stop = StopSignal::new();
    stop.stop();
    let outcome = api::analyze(&config(0, 2, 1_000, 1), input(), &stop, &()).unwrap();

    assert!(outcome.stopped);
    assert_eq!(outcome.cycles_completed, 0);
    assert!(outcome.best.is_none());
}

struct StopAfterFirstCycle {
    seen: AtomicUsize,
}

impl ProgressCallback for StopAfterFirstCycle {
    fn on_improvement(&self, _result: &BestResult) {}

    fn on_progress(&self, _progress: &Progress) -> bool {
        self.seen.fetch_add(1, Ordering::SeqCst);
        false
    }
}

#[test]
fn test_callback_can_end_unbounded_run() {
    let callback = StopAfterFirstCycle {
        seen: AtomicUsize::new(0),
    };
    let stop = StopSignal::new();
    let outcome = api::analyze(&config(0, 2, 500, 3), input(), &stop, &callback).unwrap();

    assert!(outcome.stopped);
    assert!(callback.seen.load(Ordering::SeqCst) >= 1);
    assert!(outcome.cycles_completed >= 1);
    assert!(outcome.best.is_some());
}

#[test]
fn test_filler_stripping_shortens_reported_plaintext() {
    let alphabet = Alphabet::standard(5).unwrap();
    let fillers = FillerRule::from_chars(&alphabet, 'X', 'Z').unwrap();
    let stripping = Decryptor::new(5, Some(fillers));
    let ciphertext = alphabet.sanitize(CIPHERTEXT);

    // The true plaintext carries a separator (TREXES), so stripping drops a symbol.
    let true_key = Key::from_keyword(&alphabet, "playfair example").unwrap();
    let stripped = stripping.decrypt_to_vec(&true_key, &ciphertext);
    assert_eq!(alphabet.render(&stripped), "HIDETHEGOLDINTHETREESTUMP");
    assert!(stripped.len() < ciphertext.len());

    let mut cfg = config(1, 1, 2_000, 9);
    cfg.search.strip_fillers = true;
    let outcome = solve(&cfg);
    let best = outcome.best.unwrap();

    let found = Key::parse(&alphabet, &best.key).unwrap();
    let expected = stripping.decrypt_to_vec(&found, &ciphertext);
    assert_eq!(best.plaintext, alphabet.render(&expected));
    for entry in &outcome.best_list {
        let key = Key::parse(&alphabet, &entry.key).unwrap();
        assert_eq!(
            entry.plaintext,
            alphabet.render(&stripping.decrypt_to_vec(&key, &ciphertext))
        );
    }
}
