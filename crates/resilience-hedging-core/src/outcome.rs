//! The result type exchanged between a user callback and the controller,
//! and the external predicates that decide what to do with it.

use crate::context::ResilienceContext;
use futures::future::BoxFuture;
use std::sync::Arc;

/// The result of a single attempt: either the user's success value or the
/// error it produced.
///
/// This is the unit of exchange between a user callback and the
/// [`HedgingController`](crate::controller::HedgingController) — the
/// winning `Outcome` is returned from [`execute`](crate::execute) verbatim.
#[derive(Debug, Clone)]
pub enum Outcome<T, E> {
    /// The attempt produced a usable value.
    Success(T),
    /// The attempt produced an error.
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns `true` if this outcome is [`Outcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns a reference to the success value, if any.
    #[must_use]
    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Returns a reference to the failure value, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }
}

/// Whether an [`Outcome`] is acceptable as the final result of a hedged
/// invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldAccept {
    /// The outcome is good enough to return to the caller.
    Accept,
    /// The outcome should be discarded; the controller keeps hedging if
    /// attempts remain.
    Reject,
}

/// Pure, synchronous predicate deciding whether an [`Outcome`] is
/// acceptable. Called once per completed attempt, in completion order.
pub type Validator<T, E> = Arc<dyn Fn(&Outcome<T, E>) -> ShouldAccept + Send + Sync>;

/// Factory deciding whether a given attempt index should be launched at
/// all. `execute`'s user callback and user state are fixed for the whole
/// invocation; the action-generator only gates *whether* attempt `index`
/// fires, not *what* it runs. Returning `false` means "stop launching new
/// attempts from this index on" — attempts already running are still
/// awaited. The default generator always returns `true` up to
/// `max_attempts`.
pub type ActionGenerator = Arc<dyn Fn(usize, &ResilienceContext) -> bool + Send + Sync>;

/// Fire-and-forget observer invoked when a new attempt is about to launch.
/// Errors and panics inside it are swallowed; it must never block the
/// launch of the attempt it announces.
pub type OnHedging = Arc<dyn Fn(usize) -> BoxFuture<'static, ()> + Send + Sync>;
