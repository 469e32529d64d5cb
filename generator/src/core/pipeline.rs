//! Generation pipeline: enumerator -> dedup filter -> oracle -> aggregator
//!
//! One producer task feeds pair tasks into a bounded channel and finishes with
//! an explicit end-of-sequence marker carrying the number of tasks sent. The
//! dispatcher hands tasks to at most `workers` concurrent workers and stops on
//! the marker, on cancellation, or on the first failure under fail-fast.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use shared::{logging, run_debug, run_error, run_info, run_warn, RunId};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{FailurePolicy, GeneratorConfig};
use crate::core::dedup::DedupFilter;
use crate::core::discoveries::DiscoveryAggregator;
use crate::core::limiter::RateLimiter;
use crate::core::oracle::RateLimitedOracle;
use crate::core::pairs::PairEnumerator;
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::{Oracle, RecipeStore};
use crate::types::{GenerationOutput, PairFailure, PairTask, RunSummary};

/// What travels from the enumerator to the dispatcher
#[derive(Debug)]
enum TaskEvent {
    Task(PairTask),
    /// The enumerator is exhausted after sending `produced` tasks
    Exhausted { produced: usize },
}

#[derive(Debug, Default)]
struct RunCounters {
    tasks: AtomicUsize,
    pairs_considered: AtomicUsize,
    pairs_known: AtomicUsize,
    pairs_queried: AtomicUsize,
}

/// Per-run state shared by every worker
struct RunContext<S: RecipeStore, O: Oracle> {
    run_id: RunId,
    token: CancellationToken,
    policy: FailurePolicy,
    persist: bool,
    store: Arc<S>,
    dedup: DedupFilter<S>,
    oracle: RateLimitedOracle<O>,
    aggregator: DiscoveryAggregator,
    counters: RunCounters,
}

impl<S: RecipeStore, O: Oracle> RunContext<S, O> {
    /// Dedup, query and aggregate one task
    async fn process(&self, task: PairTask) -> GeneratorResult<()> {
        self.counters.tasks.fetch_add(1, Ordering::Relaxed);
        self.counters.pairs_considered.fetch_add(task.pair_count(), Ordering::Relaxed);

        let missing = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(GeneratorError::Cancelled),
            missing = self.dedup.missing(&task.left, &task.candidates) => missing,
        };
        let missing = match missing {
            Ok(missing) => missing,
            Err(e) => return self.handle_failure(&task.left, None, e).await,
        };

        self.counters
            .pairs_known
            .fetch_add(task.pair_count() - missing.len(), Ordering::Relaxed);
        run_debug!(
            self.run_id,
            "{}: {} of {} pairs unknown",
            task.left,
            missing.len(),
            task.pair_count()
        );

        for right in &missing {
            if let Err(e) = self.resolve_pair(&task.left, right).await {
                self.handle_failure(&task.left, Some(right), e).await?;
            }
        }
        Ok(())
    }

    async fn resolve_pair(&self, left: &str, right: &str) -> GeneratorResult<()> {
        self.counters.pairs_queried.fetch_add(1, Ordering::Relaxed);
        let answer = self.oracle.query(left, right, &self.token).await?;

        if self.persist {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return Err(GeneratorError::Cancelled),
                added = self.store.add_recipe(&answer.recipe) => added?,
            }
        }

        if answer.is_new {
            run_info!(self.run_id, "✨ New discovery: {}", answer.recipe);
        } else {
            run_debug!(self.run_id, "Recipe: {}", answer.recipe);
        }
        self.aggregator.record(answer.recipe, answer.is_new).await;
        Ok(())
    }

    /// Apply the failure policy. Cancellation always wins over the error.
    async fn handle_failure(&self, left: &str, right: Option<&str>, error: GeneratorError) -> GeneratorResult<()> {
        if error.is_cancelled() || self.token.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        let pair = match right {
            Some(right) => format!("{left} + {right}"),
            None => left.to_string(),
        };

        match self.policy {
            FailurePolicy::FailFast => {
                run_error!(self.run_id, "❌ {} failed, aborting run: {}", pair, error);
                Err(error)
            }
            FailurePolicy::Isolate => {
                run_warn!(self.run_id, "⚠️ {} failed, continuing: {}", pair, error);
                self.aggregator
                    .record_failure(PairFailure {
                        left: left.to_string(),
                        right: right.map(str::to_string),
                        reason: error.to_string(),
                        retryable: error.is_retryable(),
                    })
                    .await;
                Ok(())
            }
        }
    }
}

/// Feed every task into the channel, then the end-of-sequence marker
async fn produce_tasks(enumerator: PairEnumerator, tx: mpsc::Sender<TaskEvent>, token: CancellationToken) {
    let mut produced = 0;
    for task in enumerator {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            sent = tx.send(TaskEvent::Task(task)) => {
                if sent.is_err() {
                    return;
                }
            }
        }
        produced += 1;
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {}
        _ = tx.send(TaskEvent::Exhausted { produced }) => {}
    }
}

/// Discovers recipes for a seed set through a store and an oracle
pub struct Generator<S: RecipeStore + 'static, O: Oracle + 'static> {
    config: GeneratorConfig,
    store: Arc<S>,
    dedup: DedupFilter<S>,
    oracle: RateLimitedOracle<O>,
}

impl<S: RecipeStore + 'static, O: Oracle + 'static> Generator<S, O> {
    /// Create a generator with its own rate limiter
    pub fn new(config: GeneratorConfig, store: S, oracle: O) -> GeneratorResult<Self> {
        config.validate()?;
        let limiter = Arc::new(RateLimiter::new(config.rate_per_second, config.burst)?);
        Self::with_limiter(config, Arc::new(store), Arc::new(oracle), limiter)
    }

    /// Create a generator that shares `limiter` with other generators in the process
    pub fn with_limiter(
        config: GeneratorConfig,
        store: Arc<S>,
        oracle: Arc<O>,
        limiter: Arc<RateLimiter>,
    ) -> GeneratorResult<Self> {
        config.validate()?;
        Ok(Self {
            dedup: DedupFilter::new(store.clone()),
            oracle: RateLimitedOracle::new(oracle, limiter),
            store,
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        self.oracle.limiter()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run one generation over `seeds`.
    ///
    /// Returns `Cancelled` if `cancel` fires before the run completes; no
    /// task spawned by the run outlives this call.
    pub async fn generate<I, T>(&self, seeds: I, cancel: &CancellationToken) -> GeneratorResult<GenerationOutput>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let clock = Instant::now();

        let enumerator = PairEnumerator::new(seeds);
        run_info!(
            run_id,
            "🚀 Starting generation over {} items ({} pairs, {} workers, {})",
            enumerator.item_count(),
            enumerator.pair_count(),
            self.config.workers,
            self.config.failure_policy
        );

        // Child token: fail-fast stops our workers without touching the caller's token
        let token = cancel.child_token();
        let context = Arc::new(RunContext {
            run_id: run_id.clone(),
            token: token.clone(),
            policy: self.config.failure_policy,
            persist: self.config.persist_recipes,
            store: self.store.clone(),
            dedup: self.dedup.clone(),
            oracle: self.oracle.clone(),
            aggregator: DiscoveryAggregator::new(),
            counters: RunCounters::default(),
        });

        let (tx, rx) = mpsc::channel(self.config.task_queue_capacity);
        let producer = tokio::spawn(produce_tasks(enumerator, tx, token.clone()));

        let dispatched = self.dispatch(rx, context.clone()).await;

        token.cancel();
        let producer_joined = producer.await;

        if cancel.is_cancelled() {
            logging::log_progress(&run_id, "Generation", "cancelled");
            return Err(GeneratorError::Cancelled);
        }
        if let Err(e) = dispatched {
            logging::log_error(&run_id, "Generation", &e);
            return Err(e);
        }
        producer_joined?;

        let (recipes, discoveries, failures) = context.aggregator.take().await;
        let counters = &context.counters;
        let summary = RunSummary {
            run_id: run_id.clone(),
            started_at,
            elapsed_ms: clock.elapsed().as_millis() as u64,
            tasks: counters.tasks.load(Ordering::Relaxed),
            pairs_considered: counters.pairs_considered.load(Ordering::Relaxed),
            pairs_known: counters.pairs_known.load(Ordering::Relaxed),
            pairs_queried: counters.pairs_queried.load(Ordering::Relaxed),
        };

        logging::log_success(
            &run_id,
            &format!(
                "Generation complete: {} recipes, {} discoveries, {} failures, {} known pairs skipped in {}ms",
                recipes.len(),
                discoveries.len(),
                failures.len(),
                summary.pairs_known,
                summary.elapsed_ms
            ),
        );

        Ok(GenerationOutput {
            recipes,
            discoveries,
            failures,
            summary,
        })
    }

    /// Pull tasks until the end-of-sequence marker arrives and every worker is done
    async fn dispatch(&self, mut rx: mpsc::Receiver<TaskEvent>, context: Arc<RunContext<S, O>>) -> GeneratorResult<()> {
        let mut workers: JoinSet<GeneratorResult<()>> = JoinSet::new();
        let mut received = 0usize;
        let mut exhausted = false;

        let outcome = loop {
            if exhausted && workers.is_empty() {
                break Ok(());
            }
            let accepting = !exhausted && workers.len() < self.config.workers;

            tokio::select! {
                biased;
                _ = context.token.cancelled() => break Err(GeneratorError::Cancelled),
                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    match joined {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => break Err(e),
                        Err(e) => break Err(GeneratorError::JoinError(e)),
                    }
                }
                event = rx.recv(), if accepting => match event {
                    Some(TaskEvent::Task(task)) => {
                        received += 1;
                        let context = context.clone();
                        workers.spawn(async move { context.process(task).await });
                    }
                    Some(TaskEvent::Exhausted { produced }) if produced == received => {
                        run_debug!(context.run_id, "Enumerator exhausted after {} tasks", produced);
                        exhausted = true;
                    }
                    Some(TaskEvent::Exhausted { produced }) => {
                        run_error!(context.run_id, "Enumerator reported {} tasks but {} arrived", produced, received);
                        break Err(GeneratorError::TaskSourceClosed { received });
                    }
                    None => break Err(GeneratorError::TaskSourceClosed { received }),
                },
            }
        };

        if outcome.is_err() {
            context.token.cancel();
        }
        // Every suspension point observes the token, so this drains promptly
        while let Some(joined) = workers.join_next().await {
            if let Ok(Err(e)) = joined {
                if !e.is_cancelled() {
                    run_debug!(context.run_id, "Worker finished after shutdown with: {}", e);
                }
            }
        }

        outcome
    }
}

/// Builds a generator, reporting missing collaborators as errors
pub struct GeneratorBuilder<S: RecipeStore + 'static, O: Oracle + 'static> {
    config: GeneratorConfig,
    store: Option<Arc<S>>,
    oracle: Option<Arc<O>>,
    limiter: Option<Arc<RateLimiter>>,
}

impl<S: RecipeStore + 'static, O: Oracle + 'static> GeneratorBuilder<S, O> {
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
            store: None,
            oracle: None,
            limiter: None,
        }
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn oracle(mut self, oracle: Arc<O>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Share an existing limiter instead of creating one from the config
    pub fn limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn build(self) -> GeneratorResult<Generator<S, O>> {
        let store = self
            .store
            .ok_or_else(|| GeneratorError::config("a recipe store is required"))?;
        let oracle = self
            .oracle
            .ok_or_else(|| GeneratorError::config("an oracle is required"))?;
        self.config.validate()?;
        let limiter = match self.limiter {
            Some(limiter) => limiter,
            None => Arc::new(RateLimiter::new(self.config.rate_per_second, self.config.burst)?),
        };
        Generator::with_limiter(self.config, store, oracle, limiter)
    }
}

impl<S: RecipeStore + 'static, O: Oracle + 'static> Default for GeneratorBuilder<S, O> {
    fn default() -> Self {
        Self::new()
    }
}
