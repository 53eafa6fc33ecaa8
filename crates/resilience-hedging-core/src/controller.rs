//! The hedging state machine: launches attempts, waits for the first
//! acceptable outcome, and tears everything down afterward.

use crate::attempt::AttemptExecution;
use crate::context::{AttemptKind, ResilienceContext};
use crate::events::HedgeCoreEvent;
use crate::outcome::{ActionGenerator, OnHedging, Outcome, ShouldAccept, Validator};
use crate::pool::AttemptPool;
use crate::time::TimeSource;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use resilience_core::EventListeners;
use resilience_executor::{CurrentRuntime, Executor};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A callback boxed once for the lifetime of an [`execute`](crate::execute)
/// invocation, so the same closure can be launched for every attempt.
pub(crate) type BoxedUserCallback<T, S, E> =
    Arc<dyn Fn(ResilienceContext, S) -> BoxFuture<'static, Outcome<T, E>> + Send + Sync>;

/// How secondary attempts are launched relative to the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgingMode {
    /// Wait for the running attempt to finish before launching the next
    /// one. `max_attempts = 1` makes this equivalent to a direct call.
    Serial,
    /// Launch every attempt up to `max_attempts` immediately, with no
    /// delay between them.
    Parallel,
    /// Launch the next attempt only once `Duration` has elapsed since the
    /// previous one, or the previous one completes first, whichever is
    /// sooner.
    AfterDelay(Duration),
}

/// Configuration bundle for [`execute`](crate::execute).
#[derive(Clone)]
pub struct HedgeExecutionConfig<T, E> {
    /// Hard ceiling on the number of attempts launched for one invocation.
    pub max_attempts: usize,
    /// Governs the spacing between attempt launches.
    pub hedging_mode: HedgingMode,
    /// Decides whether attempt `index` should be launched at all.
    pub action_generator: ActionGenerator,
    /// Decides whether a completed attempt's outcome is acceptable.
    pub validator: Validator<T, E>,
    /// Fire-and-forget hook invoked when an attempt is about to launch.
    pub on_hedging: Option<OnHedging>,
    /// Listeners observing [`HedgeCoreEvent`]s raised during execution.
    pub listeners: EventListeners<HedgeCoreEvent>,
}

pub(crate) enum LoadResult {
    Loaded,
    NoMoreAttempts,
    FinishedOutcome(usize),
}

pub(crate) enum StepOutcome {
    Completed(usize),
    LaunchNext,
}

pub(crate) struct HedgingController<'a, T, E> {
    primary_context: &'a mut ResilienceContext,
    pool: &'a AttemptPool<T, E>,
    time_source: Arc<dyn TimeSource>,
    max_attempts: usize,
    hedging_mode: HedgingMode,
    validator: Validator<T, E>,
    action_generator: ActionGenerator,
    on_hedging: Option<OnHedging>,
    listeners: EventListeners<HedgeCoreEvent>,
    attempts: Vec<AttemptExecution<T, E>>,
    running: FuturesUnordered<BoxFuture<'static, (usize, Outcome<T, E>)>>,
    last_seen: Option<usize>,
    accepted_index: Option<usize>,
}

impl<'a, T, E> HedgingController<'a, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(
        primary_context: &'a mut ResilienceContext,
        pool: &'a AttemptPool<T, E>,
        time_source: Arc<dyn TimeSource>,
        config: HedgeExecutionConfig<T, E>,
    ) -> Self {
        Self {
            primary_context,
            pool,
            time_source,
            max_attempts: config.max_attempts.max(1),
            hedging_mode: config.hedging_mode,
            validator: config.validator,
            action_generator: config.action_generator,
            on_hedging: config.on_hedging,
            listeners: config.listeners,
            attempts: Vec::new(),
            running: FuturesUnordered::new(),
            last_seen: None,
            accepted_index: None,
        }
    }

    /// Attempts to launch the next attempt, in index order.
    pub(crate) fn load_next<S>(&mut self, callback: &BoxedUserCallback<T, S, E>, state: &S) -> LoadResult
    where
        S: Clone + Send + Sync + 'static,
    {
        if self.attempts.len() >= self.max_attempts {
            return LoadResult::NoMoreAttempts;
        }

        let index = self.attempts.len();

        // Once the parent is cancelled there is no point launching further
        // secondaries: a freshly derived child token would already be
        // cancelled. The primary always launches regardless, so it can
        // observe and react to cancellation itself.
        if index > 0 && self.primary_context.is_cancelled() {
            return LoadResult::NoMoreAttempts;
        }

        if !(self.action_generator)(index, self.primary_context) {
            return LoadResult::NoMoreAttempts;
        }

        // A running attempt may have finished between the caller observing
        // `LaunchNext` and this call; surface it instead of launching on top
        // of an already-decided outcome.
        if !self.running.is_empty() {
            if let Some(Some((done_index, outcome))) = self.running.next().now_or_never() {
                self.record_completion(done_index, outcome);
                return LoadResult::FinishedOutcome(done_index);
            }
        }

        let kind = if index == 0 { AttemptKind::Primary } else { AttemptKind::Secondary };
        self.spawn_attempt(kind, index, Arc::clone(callback), state.clone());

        if index == 0 {
            self.listeners.emit(&HedgeCoreEvent::PrimaryStarted { timestamp: Instant::now() });
        } else {
            self.listeners.emit(&HedgeCoreEvent::AttemptStarted {
                index,
                timestamp: Instant::now(),
            });
        }

        if let Some(hook) = &self.on_hedging {
            let fut = hook(index);
            tokio::spawn(async move {
                fut.await;
            });
        }

        LoadResult::Loaded
    }

    fn spawn_attempt<S>(&mut self, kind: AttemptKind, index: usize, callback: BoxedUserCallback<T, S, E>, state: S)
    where
        S: Send + 'static,
    {
        let context = self.primary_context.child(kind, index);
        let slot = self.pool.get(kind, index, context.clone());
        self.attempts.push(slot);

        let executor = CurrentRuntime::new();
        let handle = executor.spawn(async move { callback(context, state).await });

        let boxed: BoxFuture<'static, (usize, Outcome<T, E>)> = Box::pin(async move {
            match handle.await {
                Ok(outcome) => (index, outcome),
                Err(join_error) => std::panic::resume_unwind(join_error.into_panic()),
            }
        });
        self.running.push(boxed);
    }

    /// The delay loop's heart: returns a completed attempt to evaluate, or
    /// signals that the caller should try to launch the next one.
    pub(crate) async fn try_wait_for_completion(&mut self) -> StepOutcome {
        if !self.running.is_empty() {
            if let Some(Some((index, outcome))) = self.running.next().now_or_never() {
                self.record_completion(index, outcome);
                return StepOutcome::Completed(index);
            }
        }

        if self.attempts.len() >= self.max_attempts {
            if self.running.is_empty() {
                // Every launched attempt has already completed and been
                // consumed (e.g. all rejected). Nothing left to await;
                // let the caller's next `load_next` observe `NoMoreAttempts`
                // and exhaust.
                return StepOutcome::LaunchNext;
            }
            let (index, outcome) = self
                .running
                .next()
                .await
                .expect("running is non-empty, so the stream yields at least once");
            self.record_completion(index, outcome);
            return StepOutcome::Completed(index);
        }

        match self.hedging_mode {
            HedgingMode::Parallel => StepOutcome::LaunchNext,
            _ if self.attempts.is_empty() => StepOutcome::LaunchNext,
            HedgingMode::Serial => {
                if self.running.is_empty() {
                    // The previous serial attempt already completed (and
                    // was rejected) before this call; nothing is in
                    // flight to wait on, so ask the caller to launch the
                    // next one.
                    return StepOutcome::LaunchNext;
                }
                let (index, outcome) = self
                    .running
                    .next()
                    .await
                    .expect("running is non-empty, so the stream yields at least once");
                self.record_completion(index, outcome);
                StepOutcome::Completed(index)
            }
            HedgingMode::AfterDelay(delay) => {
                let cancel = self.primary_context.cancellation().child_token();
                tokio::select! {
                    biased;
                    Some((index, outcome)) = self.running.next() => {
                        self.record_completion(index, outcome);
                        StepOutcome::Completed(index)
                    }
                    () = self.time_source.delay(delay, cancel) => StepOutcome::LaunchNext,
                }
            }
        }
    }

    fn record_completion(&mut self, index: usize, outcome: Outcome<T, E>) {
        self.attempts[index].complete(outcome);
        self.last_seen = Some(index);
    }

    /// Runs the external validator against a completed attempt's outcome.
    pub(crate) fn validate(&self, index: usize) -> ShouldAccept {
        let outcome = self.attempts[index]
            .peek_outcome()
            .unwrap_or_else(|| panic!("attempt {index} has no recorded outcome"));
        (self.validator)(outcome)
    }

    /// Marks a completed attempt's outcome as rejected, emitting the event;
    /// the slot stays around until teardown.
    pub(crate) fn reject(&mut self, index: usize) {
        self.listeners.emit(&HedgeCoreEvent::AttemptRejected {
            index,
            timestamp: Instant::now(),
        });
    }

    /// Marks `index` as the winner and returns its outcome.
    pub(crate) fn accept(&mut self, index: usize) -> Outcome<T, E> {
        self.attempts[index].accept();
        self.accepted_index = Some(index);
        self.listeners.emit(&HedgeCoreEvent::AttemptAccepted {
            index,
            timestamp: Instant::now(),
        });
        self.attempts[index]
            .take_outcome()
            .expect("accepted attempt must carry an outcome")
    }

    /// No attempt was accepted and none remain to launch: return the last
    /// completed attempt's outcome unchanged, per this crate's resolution
    /// of validator/generator inconsistency. Deliberately does not call
    /// `AttemptExecution::accept` — the exhausted attempt was rejected, not
    /// won, and must still be eligible for the pool to recycle in
    /// `dispose`. `accepted_index` (tracked here on the controller, not on
    /// the attempt itself) is enough for `dispose` to find its context for
    /// the property merge.
    pub(crate) fn exhaust(&mut self) -> Outcome<T, E> {
        let index = self
            .last_seen
            .expect("exhaustion requires at least one attempt to have completed");
        self.accepted_index = Some(index);
        self.listeners.emit(&HedgeCoreEvent::AllAttemptsExhausted {
            attempts: self.attempts.len(),
            timestamp: Instant::now(),
        });
        self.attempts[index]
            .take_outcome()
            .expect("last-seen attempt must carry an outcome")
    }

    pub(crate) fn running_is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Cancels and awaits every outstanding attempt, merges the winner's
    /// properties onto the caller's context, and returns every slot to the
    /// pool. Runs on every exit path.
    pub(crate) async fn dispose(mut self, winning_outcome: Outcome<T, E>) -> Outcome<T, E> {
        for attempt in &self.attempts {
            attempt.cancel();
        }

        while let Some((index, outcome)) = self.running.next().await {
            self.record_completion(index, outcome);
        }

        if let Some(winner_index) = self.accepted_index {
            let winner_context = self.attempts[winner_index].context().clone();
            self.primary_context.upsert_properties_from(&winner_context);
        }

        for attempt in self.attempts.drain(..) {
            self.pool.put(attempt);
        }

        winning_outcome
    }
}
