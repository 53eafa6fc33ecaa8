//! Events emitted during a hedged invocation.

use std::time::Instant;
use resilience_core::ResilienceEvent;

/// Events emitted by [`execute`](crate::execute) as a hedged invocation
/// progresses, for listeners registered via
/// [`EventListeners`](resilience_core::EventListeners).
#[derive(Debug, Clone)]
pub enum HedgeCoreEvent {
    /// The primary attempt (index 0) was launched.
    PrimaryStarted {
        /// When this event occurred.
        timestamp: Instant,
    },

    /// A secondary attempt was launched, either because the hedging delay
    /// elapsed or because `hedging_mode` is `Parallel`.
    AttemptStarted {
        /// 0-based launch index of the attempt.
        index: usize,
        /// When this event occurred.
        timestamp: Instant,
    },

    /// An attempt's outcome was accepted as the invocation's final result.
    AttemptAccepted {
        /// 0-based launch index of the accepted attempt.
        index: usize,
        /// When this event occurred.
        timestamp: Instant,
    },

    /// An attempt completed but the validator rejected its outcome; the
    /// controller keeps hedging if attempts remain.
    AttemptRejected {
        /// 0-based launch index of the rejected attempt.
        index: usize,
        /// When this event occurred.
        timestamp: Instant,
    },

    /// The action-generator declined to launch any further attempts, and
    /// every attempt launched so far finished without an accepted outcome.
    AllAttemptsExhausted {
        /// Total number of attempts launched.
        attempts: usize,
        /// When this event occurred.
        timestamp: Instant,
    },
}

impl ResilienceEvent for HedgeCoreEvent {
    fn event_type(&self) -> &'static str {
        match self {
            HedgeCoreEvent::PrimaryStarted { .. } => "primary_started",
            HedgeCoreEvent::AttemptStarted { .. } => "attempt_started",
            HedgeCoreEvent::AttemptAccepted { .. } => "attempt_accepted",
            HedgeCoreEvent::AttemptRejected { .. } => "attempt_rejected",
            HedgeCoreEvent::AllAttemptsExhausted { .. } => "all_attempts_exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            HedgeCoreEvent::PrimaryStarted { timestamp }
            | HedgeCoreEvent::AttemptStarted { timestamp, .. }
            | HedgeCoreEvent::AttemptAccepted { timestamp, .. }
            | HedgeCoreEvent::AttemptRejected { timestamp, .. }
            | HedgeCoreEvent::AllAttemptsExhausted { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        "hedge"
    }
}
