//! Per-slot bookkeeping for a single launched attempt.

use crate::context::{AttemptKind, ResilienceContext};
use crate::outcome::Outcome;

/// The recyclable state behind one attempt slot.
///
/// `AttemptExecution` never owns the spawned task itself — the controller
/// tracks the running future in its own `FuturesUnordered` set, keyed by the
/// same index used here. This struct only holds what needs to survive
/// between a slot being handed out by the [`AttemptPool`](crate::pool::AttemptPool)
/// and handed back: which attempt it was, the context it ran with, and the
/// outcome it finished with, if any.
pub struct AttemptExecution<T, E> {
    kind: AttemptKind,
    index: usize,
    context: ResilienceContext,
    outcome: Option<Outcome<T, E>>,
    accepted: bool,
    completed: bool,
}

impl<T, E> AttemptExecution<T, E> {
    /// Initializes a slot for a freshly launched attempt.
    pub(crate) fn initialize(kind: AttemptKind, index: usize, context: ResilienceContext) -> Self {
        Self {
            kind,
            index,
            context,
            outcome: None,
            accepted: false,
            completed: false,
        }
    }

    /// Which attempt this is.
    #[must_use]
    pub fn kind(&self) -> AttemptKind {
        self.kind
    }

    /// The 0-based launch index of this attempt.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The context this attempt was launched with.
    #[must_use]
    pub fn context(&self) -> &ResilienceContext {
        &self.context
    }

    /// Whether the attempt has reported a result.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the attempt's outcome has been accepted as the invocation's
    /// final result.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Records the attempt's outcome. Called exactly once, when the task
    /// backing this slot resolves.
    pub(crate) fn complete(&mut self, outcome: Outcome<T, E>) {
        self.outcome = Some(outcome);
        self.completed = true;
    }

    /// Marks this attempt's outcome as the one returned to the caller.
    pub(crate) fn accept(&mut self) {
        self.accepted = true;
    }

    /// Signals cooperative cancellation to this attempt's context.
    pub(crate) fn cancel(&self) {
        self.context.cancel();
    }

    /// Takes the recorded outcome, if the attempt has completed.
    pub(crate) fn take_outcome(&mut self) -> Option<Outcome<T, E>> {
        self.outcome.take()
    }

    /// Borrows the recorded outcome without consuming it, for the validator
    /// to inspect before the controller decides whether to accept it.
    pub(crate) fn peek_outcome(&self) -> Option<&Outcome<T, E>> {
        self.outcome.as_ref()
    }

    /// Rewrites a recycled slot in place for a new attempt, avoiding a fresh
    /// allocation for the struct itself. The
    /// [`AttemptPool`](crate::pool::AttemptPool) only recycles slots that
    /// are `completed` and not `accepted`.
    pub(crate) fn reinitialize(&mut self, kind: AttemptKind, index: usize, context: ResilienceContext) {
        self.kind = kind;
        self.index = index;
        self.context = context;
        self.outcome = None;
        self.accepted = false;
        self.completed = false;
    }
}
