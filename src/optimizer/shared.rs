use crate::consts::MAX_BEST_LIST_SIZE;
use crate::scorer::Score;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// A scored key together with the context it was found in.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BestResult {
    pub score: Score,
    /// Row-major key symbols.
    pub key: String,
    pub plaintext: String,
    pub task: usize,
    pub cycle: usize,
    pub elapsed: Duration,
    pub evaluations: u64,
}

/// Coarse progress snapshot, emitted once per finished cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub cycles_completed: usize,
    /// `None` when the search runs until stopped.
    pub cycles_planned: Option<usize>,
    pub evaluations: u64,
    pub elapsed: Duration,
    pub best_score: Option<Score>,
}

impl Progress {
    pub fn fraction(&self) -> Option<f64> {
        self.cycles_planned
            .filter(|&p| p > 0)
            .map(|p| (self.cycles_completed as f64 / p as f64).min(1.0))
    }

    pub fn keys_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.evaluations as f64 / secs
        } else {
            0.0
        }
    }
}

/// Receives search events. Called from worker threads; improvements arrive
/// serialized and in strictly increasing score order.
pub trait ProgressCallback: Send + Sync {
    fn on_improvement(&self, result: &BestResult);

    /// Returning `false` stops the search.
    fn on_progress(&self, _progress: &Progress) -> bool {
        true
    }
}

impl ProgressCallback for () {
    fn on_improvement(&self, _result: &BestResult) {}
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    Improvement(BestResult),
    Progress(Progress),
}

/// Forwards events to a channel; a dropped receiver stops the search.
impl ProgressCallback for Sender<SearchEvent> {
    fn on_improvement(&self, result: &BestResult) {
        let _ = self.send(SearchEvent::Improvement(result.clone()));
    }

    fn on_progress(&self, progress: &Progress) -> bool {
        self.send(SearchEvent::Progress(progress.clone())).is_ok()
    }
}

/// Cooperative cancellation flag, polled by every task between moves.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Raises the flag from a helper thread once `limit` has passed.
    pub fn stop_after(&self, limit: Duration) {
        let signal = self.clone();
        std::thread::spawn(move || {
            std::thread::sleep(limit);
            signal.stop();
        });
    }
}

/// Highest-scoring results in descending order; earlier entries win ties.
#[derive(Debug, Clone)]
pub struct BestList {
    capacity: usize,
    discard_same_plaintexts: bool,
    entries: Vec<BestResult>,
}

impl BestList {
    pub fn new(capacity: usize, discard_same_plaintexts: bool) -> Self {
        Self {
            capacity,
            discard_same_plaintexts,
            entries: Vec::with_capacity(capacity.min(MAX_BEST_LIST_SIZE)),
        }
    }

    pub fn entries(&self) -> &[BestResult] {
        &self.entries
    }

    /// Returns `true` if the entry made it into the list.
    pub fn offer(&mut self, entry: BestResult) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if let Some(worst) = self.entries.last() {
            if self.entries.len() >= self.capacity && entry.score <= worst.score {
                return false;
            }
        }

        let duplicate = self.entries.iter().position(|e| {
            e.key == entry.key || (self.discard_same_plaintexts && e.plaintext == entry.plaintext)
        });
        if let Some(i) = duplicate {
            if self.entries[i].score >= entry.score {
                return false;
            }
            self.entries.remove(i);
        }

        let at = self.entries.partition_point(|e| e.score >= entry.score);
        self.entries.insert(at, entry);
        self.entries.truncate(self.capacity);
        true
    }
}

struct BestState {
    best: Option<BestResult>,
    list: BestList,
}

/// State shared by all tasks of one run.
///
/// `best_score` is read without locking on every accepted move; the mutex is only
/// taken when a task believes it beat it, and the comparison is repeated under
/// the lock before anything is published.
pub struct SharedBest {
    best_score: AtomicI64,
    evaluations: AtomicU64,
    cycles_completed: AtomicUsize,
    started: Instant,
    state: Mutex<BestState>,
}

impl SharedBest {
    pub fn new(best_list_size: usize, discard_same_plaintexts: bool) -> Self {
        Self {
            best_score: AtomicI64::new(Score::MIN),
            evaluations: AtomicU64::new(0),
            cycles_completed: AtomicUsize::new(0),
            started: Instant::now(),
            state: Mutex::new(BestState {
                best: None,
                list: BestList::new(best_list_size, discard_same_plaintexts),
            }),
        }
    }

    #[inline(always)]
    pub fn best_score(&self) -> Score {
        self.best_score.load(Ordering::Acquire)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn add_evaluations(&self, count: u64) {
        self.evaluations.fetch_add(count, Ordering::Relaxed);
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Returns the new total.
    pub fn finish_cycle(&self) -> usize {
        self.cycles_completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn cycles_completed(&self) -> usize {
        self.cycles_completed.load(Ordering::Acquire)
    }

    /// Publishes `candidate` if it still beats the global best. The callback runs
    /// under the lock so reports never interleave or go backwards.
    pub fn try_improve(&self, candidate: BestResult, callback: &dyn ProgressCallback) -> bool {
        let mut state = self.lock();
        if candidate.score <= self.best_score.load(Ordering::Acquire) {
            return false;
        }
        self.best_score.store(candidate.score, Ordering::Release);
        debug!(
            "⭐ Task {} cycle {}: new best {}",
            candidate.task, candidate.cycle, candidate.score
        );
        callback.on_improvement(&candidate);
        state.list.offer(candidate.clone());
        state.best = Some(candidate);
        true
    }

    pub fn offer(&self, entry: BestResult) -> bool {
        self.lock().list.offer(entry)
    }

    pub fn best(&self) -> Option<BestResult> {
        self.lock().best.clone()
    }

    pub fn best_list(&self) -> Vec<BestResult> {
        self.lock().list.entries().to_vec()
    }

    pub fn progress(&self, cycles_planned: Option<usize>) -> Progress {
        let best_score = self.best_score();
        Progress {
            cycles_completed: self.cycles_completed(),
            cycles_planned,
            evaluations: self.evaluations(),
            elapsed: self.elapsed(),
            best_score: (best_score != Score::MIN).then_some(best_score),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BestState> {
        // A panicking callback must not take the results down with it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
