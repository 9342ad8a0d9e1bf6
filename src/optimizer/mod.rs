pub mod anneal;
pub mod runner;
pub mod shared;
pub mod transform;

pub use self::anneal::ChurnTable;
pub use self::runner::{Optimizer, SearchOutcome};
pub use self::shared::{
    BestList, BestResult, Progress, ProgressCallback, SearchEvent, SharedBest, StopSignal,
};
pub use self::transform::{Move, MoveKind, Transform};

use crate::alphabet::Alphabet;
use crate::cipher::Decryptor;
use crate::config::SearchParams;
use crate::consts::EVAL_FLUSH_INTERVAL;
use crate::error::PfResult;
use crate::key::{Key, PermutationTable};
use crate::scorer::{Score, Scorer};
use fastrand::Rng;
use std::sync::Arc;

/// Everything a run needs that never changes while it runs. Shared read-only by
/// all tasks.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub alphabet: Alphabet,
    pub ciphertext: Vec<u8>,
    pub decryptor: Decryptor,
    pub scorer: Scorer,
    pub permutations: Arc<PermutationTable>,
    pub move_kinds: Vec<MoveKind>,
    pub churn: ChurnTable,
    pub params: SearchParams,
}

#[inline(always)]
fn evaluate(ctx: &SearchContext, key: &Key, buffer: &mut [u8]) -> Score {
    let len = ctx.decryptor.decrypt(key, &ctx.ciphertext, buffer);
    ctx.scorer.score(&buffer[..len])
}

/// One independent hill-climbing worker with its own keys, move ordering and
/// random stream.
#[repr(align(64))]
pub struct SearchTask {
    ctx: Arc<SearchContext>,
    id: usize,
    rng: Rng,
    transform: Transform,

    current: Key,
    candidate: Key,
    current_score: Score,
    cycle_best: Key,
    cycle_best_score: Score,
    plaintext: Vec<u8>,

    counter: u64,
    pending_evaluations: u64,
}

impl SearchTask {
    pub fn new(ctx: Arc<SearchContext>, id: usize, seed: Option<u64>) -> PfResult<Self> {
        let rng = match seed {
            Some(s) => Rng::with_seed(s),
            None => Rng::new(),
        };
        let dim = ctx.alphabet.dim();
        let transform = Transform::new(dim, &ctx.move_kinds, ctx.permutations.clone())?;
        let plaintext = vec![0; ctx.ciphertext.len()];

        Ok(Self {
            ctx,
            id,
            rng,
            transform,
            current: Key::new(dim),
            candidate: Key::new(dim),
            current_score: Score::MIN,
            cycle_best: Key::new(dim),
            cycle_best_score: Score::MIN,
            plaintext,
            counter: 0,
            pending_evaluations: 0,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn current_key(&self) -> &Key {
        &self.current
    }

    pub fn current_score(&self) -> Score {
        self.current_score
    }

    /// Runs restart cycles until the budget is spent or `stop` is raised.
    /// `planned_total` is the cycle count summed over all tasks, for progress.
    pub fn run(
        &mut self,
        shared: &SharedBest,
        stop: &StopSignal,
        callback: &dyn ProgressCallback,
        planned_total: Option<usize>,
    ) {
        let planned = self.ctx.params.cycles;
        let mut cycle = 0;

        while planned == 0 || cycle < planned {
            if stop.is_stopped() {
                break;
            }
            let finished = self.run_cycle(cycle, shared, stop, callback);
            // An interrupted cycle still ranks what it found so far.
            self.offer_cycle_best(cycle, shared);
            if !finished {
                break;
            }
            cycle += 1;

            shared.finish_cycle();
            let progress = shared.progress(planned_total);
            if !callback.on_progress(&progress) {
                stop.stop();
            }
        }
        self.flush(shared);
    }

    /// One restart: random key, then `inner_steps` mutate/score/accept rounds.
    /// Returns `false` if interrupted.
    pub fn run_cycle(
        &mut self,
        cycle: usize,
        shared: &SharedBest,
        stop: &StopSignal,
        callback: &dyn ProgressCallback,
    ) -> bool {
        let ctx = self.ctx.clone();
        let factor = ctx.params.churn_factor;

        self.transform.randomize(&mut self.rng);
        self.current.random(&mut self.rng);
        let score = evaluate(&ctx, &self.current, &mut self.plaintext);
        self.current_score = score;
        self.current.copy_into(&mut self.cycle_best);
        self.cycle_best_score = score;
        self.pending_evaluations += 1;
        if self.current_score > shared.best_score() {
            self.report(cycle, shared, callback);
        }

        for _ in 0..ctx.params.inner_steps {
            if stop.is_stopped() {
                return false;
            }

            self.counter += 1;
            self.transform
                .apply(&self.current, &mut self.candidate, self.counter);
            let new_score = evaluate(&ctx, &self.candidate, &mut self.plaintext);

            self.pending_evaluations += 1;
            if self.pending_evaluations >= EVAL_FLUSH_INTERVAL {
                self.flush(shared);
            }

            if anneal::accept(new_score, self.current_score, &ctx.churn, factor, &mut self.rng) {
                std::mem::swap(&mut self.current, &mut self.candidate);
                self.current_score = new_score;

                if new_score > self.cycle_best_score {
                    self.current.copy_into(&mut self.cycle_best);
                    self.cycle_best_score = new_score;
                }
                if new_score > shared.best_score() {
                    self.report(cycle, shared, callback);
                }
            }
        }
        true
    }

    fn report(&mut self, cycle: usize, shared: &SharedBest, callback: &dyn ProgressCallback) {
        self.flush(shared);
        let result = snapshot(
            &self.ctx,
            &self.current,
            self.current_score,
            &mut self.plaintext,
            (self.id, cycle),
            shared,
        );
        shared.try_improve(result, callback);
    }

    /// Hands the best key of the finished cycle to the best list.
    fn offer_cycle_best(&mut self, cycle: usize, shared: &SharedBest) {
        self.flush(shared);
        let result = snapshot(
            &self.ctx,
            &self.cycle_best,
            self.cycle_best_score,
            &mut self.plaintext,
            (self.id, cycle),
            shared,
        );
        shared.offer(result);
    }

    fn flush(&mut self, shared: &SharedBest) {
        if self.pending_evaluations > 0 {
            shared.add_evaluations(self.pending_evaluations);
            self.pending_evaluations = 0;
        }
    }
}

fn snapshot(
    ctx: &SearchContext,
    key: &Key,
    score: Score,
    buffer: &mut [u8],
    (task, cycle): (usize, usize),
    shared: &SharedBest,
) -> BestResult {
    let len = ctx.decryptor.decrypt(key, &ctx.ciphertext, buffer);
    BestResult {
        score,
        key: key.to_compact(&ctx.alphabet),
        plaintext: ctx.alphabet.render(&buffer[..len]),
        task,
        cycle,
        elapsed: shared.elapsed(),
        evaluations: shared.evaluations(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{self, AnalysisInput};
    use crate::config::Config;
    use std::time::Duration;

    fn context(inner_steps: usize) -> Arc<SearchContext> {
        let mut cfg = Config::default();
        cfg.search.inner_steps = inner_steps;
        let input = AnalysisInput {
            ciphertext: "BMODZBXDNABEKUDMUIXMMOUVIF".to_string(),
            crib: Some("HIDETHEGOLD".to_string()),
            ngrams: None,
        };
        Arc::new(api::prepare(&cfg, input).unwrap())
    }

    fn unbeatable() -> BestResult {
        BestResult {
            score: Score::MAX,
            key: "-".to_string(),
            plaintext: "-".to_string(),
            task: usize::MAX,
            cycle: 0,
            elapsed: Duration::ZERO,
            evaluations: 0,
        }
    }

    #[test]
    fn test_interrupted_cycle_reaches_best_list() {
        let shared = SharedBest::new(10, true);
        assert!(shared.try_improve(unbeatable(), &()));

        // The cycle is far too long to finish before the timer fires.
        let mut task = SearchTask::new(context(usize::MAX), 0, Some(8)).unwrap();
        let stop = StopSignal::new();
        stop.stop_after(Duration::from_millis(50));
        task.run(&shared, &stop, &(), None);

        assert_eq!(shared.cycles_completed(), 0);
        let list = shared.best_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].task, 0);
        assert_eq!(list[1].cycle, 0);
        assert_eq!(shared.best().map(|b| b.task), Some(usize::MAX));
    }

    #[test]
    fn test_pre_raised_stop_offers_nothing() {
        let shared = SharedBest::new(10, true);
        let mut task = SearchTask::new(context(100), 0, Some(8)).unwrap();
        let stop = StopSignal::new();
        stop.stop();
        task.run(&shared, &stop, &(), None);

        assert!(shared.best_list().is_empty());
        assert_eq!(shared.evaluations(), 0);
    }
}
