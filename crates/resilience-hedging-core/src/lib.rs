//! Hedging execution core.
//!
//! Hedging reduces tail latency by launching redundant attempts at a single
//! logical operation and returning whichever acceptable outcome arrives
//! first. Instead of waiting out a slow attempt, a second (and third, …) is
//! launched after a delay, in parallel, or as soon as the previous one
//! finishes, and every attempt but the winner is cancelled.
//!
//! # Modes
//!
//! - [`HedgingMode::AfterDelay`] — the default. Launch the next attempt
//!   only once the delay elapses or the previous attempt finishes,
//!   whichever happens first. Cheapest on resources; only pays for extra
//!   attempts when the primary is actually slow.
//! - [`HedgingMode::Parallel`] — launch every attempt up to `max_attempts`
//!   immediately. Minimizes latency at the cost of redundant work on every
//!   call.
//! - [`HedgingMode::Serial`] — wait for each attempt to finish before
//!   launching the next. With `max_attempts = 1` this is equivalent to a
//!   direct call.
//!
//! # Example
//!
//! ```rust
//! use resilience_hedging_core::{
//!     execute, AttemptPool, HedgeExecutionConfigBuilder, Outcome, ResilienceContext, TokioTimeSource,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let pool: AttemptPool<&'static str, &'static str> = AttemptPool::new();
//! let config = HedgeExecutionConfigBuilder::new()
//!     .max_attempts(2)
//!     .delay(Duration::from_millis(50))
//!     .build();
//!
//! let mut context = ResilienceContext::new();
//! let outcome = execute(
//!     &mut context,
//!     |_context, _state| Box::pin(async { Outcome::Success("hello") }),
//!     (),
//!     config,
//!     Arc::new(TokioTimeSource),
//!     &pool,
//! )
//! .await;
//!
//! assert!(matches!(outcome, Outcome::Success("hello")));
//! # }
//! ```
//!
//! # Cancellation
//!
//! Every attempt but the winner is cancelled cooperatively: its
//! [`ResilienceContext`]'s [`CancellationToken`](tokio_util::sync::CancellationToken)
//! is signalled, and it is the attempt's own responsibility to notice and
//! wind down. Cancelling the invocation's parent context (for example, the
//! caller's own request being cancelled) reaches every attempt the same
//! way, since each attempt's token is a child of the parent's.

mod attempt;
mod config;
mod context;
mod controller;
mod events;
mod outcome;
mod pool;
mod time;

pub use config::HedgeExecutionConfigBuilder;
pub use context::{AttemptKind, AttemptTag, PropertyValue, ResilienceContext};
pub use controller::{HedgeExecutionConfig, HedgingMode};
pub use events::HedgeCoreEvent;
pub use outcome::{ActionGenerator, OnHedging, Outcome, ShouldAccept, Validator};
pub use pool::AttemptPool;
pub use time::{ManualTimeSource, TimeSource, TokioTimeSource};

use controller::{HedgingController, LoadResult, StepOutcome};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Runs a hedged invocation to completion.
///
/// `user_callback` is invoked once per launched attempt, with a
/// per-attempt [`ResilienceContext`] derived from `parent_context` and a
/// clone of `user_state`. The returned [`Outcome`] is whichever attempt's
/// result the configured [`Validator`] accepted first, in completion
/// order; if none is accepted before attempts are exhausted, the last
/// completed attempt's outcome is returned unchanged.
///
/// Every attempt other than the winner is cancelled, awaited, and returned
/// to `pool` before this function returns; the winner's context properties
/// are merged onto `parent_context`.
pub async fn execute<T, S, E>(
    parent_context: &mut ResilienceContext,
    user_callback: impl Fn(ResilienceContext, S) -> BoxFuture<'static, Outcome<T, E>> + Send + Sync + 'static,
    user_state: S,
    config: HedgeExecutionConfig<T, E>,
    time_source: Arc<dyn TimeSource>,
    pool: &AttemptPool<T, E>,
) -> Outcome<T, E>
where
    T: Send + 'static,
    S: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    let user_callback: controller::BoxedUserCallback<T, S, E> = Arc::new(user_callback);
    let mut controller = HedgingController::new(parent_context, pool, time_source, config);

    match controller.load_next(&user_callback, &user_state) {
        LoadResult::Loaded => {}
        LoadResult::NoMoreAttempts => {
            // The action-generator declined even the primary: nothing was
            // ever launched, so there is nothing to wait for or tear down.
            unreachable!("the default and documented action-generator contract always admits the primary attempt")
        }
        LoadResult::FinishedOutcome(_) => {
            unreachable!("no attempt can have completed before the first one is launched")
        }
    }

    let winning_outcome = loop {
        match controller.try_wait_for_completion().await {
            StepOutcome::Completed(index) => match controller.validate(index) {
                ShouldAccept::Accept => break controller.accept(index),
                ShouldAccept::Reject => {
                    controller.reject(index);
                }
            },
            StepOutcome::LaunchNext => match controller.load_next(&user_callback, &user_state) {
                LoadResult::Loaded => {}
                LoadResult::NoMoreAttempts => {
                    if controller.running_is_empty() {
                        break controller.exhaust();
                    }
                }
                LoadResult::FinishedOutcome(index) => match controller.validate(index) {
                    ShouldAccept::Accept => break controller.accept(index),
                    ShouldAccept::Reject => {
                        controller.reject(index);
                    }
                },
            },
        }
    };

    controller.dispose(winning_outcome).await
}
