//! Builder for [`HedgeExecutionConfig`].

use crate::controller::{HedgeExecutionConfig, HedgingMode};
use crate::events::HedgeCoreEvent;
use crate::outcome::{ActionGenerator, OnHedging, Outcome, ShouldAccept, Validator};
use resilience_core::EventListeners;
use std::sync::Arc;
use std::time::Duration;

fn default_validator<T, E>() -> Validator<T, E> {
    Arc::new(|outcome: &Outcome<T, E>| {
        if outcome.is_success() {
            ShouldAccept::Accept
        } else {
            ShouldAccept::Reject
        }
    })
}

fn default_action_generator() -> ActionGenerator {
    Arc::new(|_index, _context| true)
}

/// Builder for [`HedgeExecutionConfig`].
///
/// Defaults to two attempts total (one primary, one secondary) fired one
/// second apart, accepting the first `Success` outcome seen.
///
/// # Example
///
/// ```rust
/// use resilience_hedging_core::HedgeExecutionConfigBuilder;
/// use std::time::Duration;
///
/// let config = HedgeExecutionConfigBuilder::<String, std::io::Error>::new()
///     .max_attempts(3)
///     .delay(Duration::from_millis(50))
///     .build();
/// ```
pub struct HedgeExecutionConfigBuilder<T, E> {
    config: HedgeExecutionConfig<T, E>,
}

impl<T, E> Default for HedgeExecutionConfigBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> HedgeExecutionConfigBuilder<T, E> {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HedgeExecutionConfig {
                max_attempts: 2,
                hedging_mode: HedgingMode::AfterDelay(Duration::from_secs(1)),
                action_generator: default_action_generator(),
                validator: default_validator(),
                on_hedging: None,
                listeners: EventListeners::default(),
            },
        }
    }

    /// Sets the hard ceiling on attempts launched for one invocation.
    ///
    /// Clamped to at least 1.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.config.max_attempts = max_attempts.max(1);
        self
    }

    /// Fires every attempt immediately, with no delay between launches.
    #[must_use]
    pub fn parallel(mut self) -> Self {
        self.config.hedging_mode = HedgingMode::Parallel;
        self
    }

    /// Waits for each attempt to finish before launching the next one.
    #[must_use]
    pub fn serial(mut self) -> Self {
        self.config.hedging_mode = HedgingMode::Serial;
        self
    }

    /// Launches the next attempt after `delay`, or as soon as the previous
    /// one completes, whichever is sooner.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.hedging_mode = HedgingMode::AfterDelay(delay);
        self
    }

    /// Overrides the predicate deciding whether a completed attempt's
    /// outcome should be accepted as the invocation's final result.
    #[must_use]
    pub fn validator(mut self, validator: Validator<T, E>) -> Self {
        self.config.validator = validator;
        self
    }

    /// Overrides the predicate deciding whether attempt `index` should be
    /// launched at all.
    #[must_use]
    pub fn action_generator(mut self, action_generator: ActionGenerator) -> Self {
        self.config.action_generator = action_generator;
        self
    }

    /// Registers a fire-and-forget hook invoked when an attempt launches.
    #[must_use]
    pub fn on_hedging(mut self, on_hedging: OnHedging) -> Self {
        self.config.on_hedging = Some(on_hedging);
        self
    }

    /// Registers a listener for [`HedgeCoreEvent`]s.
    #[must_use]
    pub fn add_listener<L>(mut self, listener: L) -> Self
    where
        L: resilience_core::EventListener<HedgeCoreEvent> + 'static,
    {
        self.config.listeners.add(listener);
        self
    }

    /// Builds the final configuration.
    #[must_use]
    pub fn build(self) -> HedgeExecutionConfig<T, E> {
        self.config
    }
}
