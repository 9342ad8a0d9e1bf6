use crate::error::PfResult;
use crate::optimizer::{
    BestResult, ProgressCallback, SearchContext, SearchTask, SharedBest, StopSignal,
};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Final state of a run, whether it finished its budget or was stopped.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub best: Option<BestResult>,
    pub best_list: Vec<BestResult>,
    pub evaluations: u64,
    pub cycles_completed: usize,
    pub elapsed: Duration,
    pub stopped: bool,
}

/// Runs independent [`SearchTask`]s on a dedicated rayon pool, one worker per task.
pub struct Optimizer {
    ctx: Arc<SearchContext>,
}

impl Optimizer {
    pub fn new(ctx: Arc<SearchContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }

    /// Blocks until every task has finished its cycles or `stop` is raised.
    /// With a fixed seed, task `i` draws from seed `seed + i`.
    pub fn run<CB: ProgressCallback>(
        &self,
        stop: &StopSignal,
        callback: &CB,
    ) -> PfResult<SearchOutcome> {
        let params = &self.ctx.params;
        let threads = params.resolved_threads();
        let planned_total = (params.cycles > 0)
            .then(|| params.cycles.checked_mul(threads))
            .flatten();

        let mut tasks: Vec<SearchTask> = (0..threads)
            .map(|i| {
                let seed = params.seed.map(|s| s.wrapping_add(i as u64));
                SearchTask::new(self.ctx.clone(), i, seed)
            })
            .collect::<PfResult<_>>()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("search-{}", i))
            .build()?;

        let shared = SharedBest::new(params.best_list_size, params.discard_same_plaintexts);
        info!(
            "🚀 Starting {} task(s): {} inner steps per cycle, {}",
            threads,
            params.inner_steps,
            match params.cycles {
                0 => "until stopped".to_string(),
                n => format!("{} cycle(s) each", n),
            }
        );

        let callback: &dyn ProgressCallback = callback;
        pool.install(|| {
            tasks
                .par_iter_mut()
                .with_max_len(1)
                .for_each(|task| {
                    debug!("Task {} started", task.id());
                    task.run(&shared, stop, callback, planned_total);
                    debug!("Task {} finished", task.id());
                });
        });

        let outcome = SearchOutcome {
            best: shared.best(),
            best_list: shared.best_list(),
            evaluations: shared.evaluations(),
            cycles_completed: shared.cycles_completed(),
            elapsed: shared.elapsed(),
            stopped: stop.is_stopped(),
        };

        info!(
            "🏁 Search ended after {} cycle(s), {} keys in {:.2?}",
            outcome.cycles_completed, outcome.evaluations, outcome.elapsed
        );
        Ok(outcome)
    }
}
