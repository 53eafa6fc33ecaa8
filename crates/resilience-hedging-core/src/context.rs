//! The per-invocation capability bag passed to every attempt.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Which attempt a [`ResilienceContext`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    /// The first attempt launched for an invocation.
    Primary,
    /// An attempt launched speculatively after the primary (or a prior
    /// secondary) was judged too slow or unacceptable.
    Secondary,
}

/// Identifies which attempt a context was cloned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTag {
    /// `Primary` or `Secondary`.
    pub kind: AttemptKind,
    /// 0-based position in launch order.
    pub index: usize,
}

/// A type-erased property value stored in a [`ResilienceContext`]'s bag.
pub type PropertyValue = Arc<dyn Any + Send + Sync>;

/// Per-invocation state shared across a hedged operation's attempts.
///
/// `ResilienceContext` is deliberately a plain record rather than a trait
/// object hierarchy: a cancellation token, a property map, and a flag
/// telling the core whether continuations should resume on the originating
/// synchronization context. Each attempt gets its own clone via [`child`],
/// with a cancellation token that is a genuine child of the parent's — the
/// controller can cancel one attempt without disturbing its siblings, while
/// cancelling the parent still reaches every attempt.
///
/// [`child`]: ResilienceContext::child
#[derive(Clone)]
pub struct ResilienceContext {
    cancellation: CancellationToken,
    properties: HashMap<String, PropertyValue>,
    continue_on_captured_context: bool,
    attempt_tag: Option<AttemptTag>,
}

impl ResilienceContext {
    /// Creates a fresh, unattached context for a new top-level invocation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            properties: HashMap::new(),
            continue_on_captured_context: false,
            attempt_tag: None,
        }
    }

    /// Sets whether continuations should resume on the originating
    /// synchronization context. Defaults to `false` (the server case); this
    /// core only ever targets multi-threaded executors, so the flag is
    /// recorded for forward compatibility rather than acted on here.
    #[must_use]
    pub fn with_continue_on_captured_context(mut self, value: bool) -> Self {
        self.continue_on_captured_context = value;
        self
    }

    /// Returns `true` if continuations should resume on the originating
    /// synchronization context.
    #[must_use]
    pub fn continue_on_captured_context(&self) -> bool {
        self.continue_on_captured_context
    }

    /// The cancellation token governing this context.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Signals cancellation to this context and every context derived from
    /// it via [`child`](Self::child).
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Returns `true` if this context (or an ancestor) has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Which attempt this context belongs to, if any.
    #[must_use]
    pub fn attempt_tag(&self) -> Option<AttemptTag> {
        self.attempt_tag
    }

    /// Inserts or replaces a property, upserting on key collision.
    pub fn set_property(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.properties.insert(key.into(), value);
    }

    /// Reads a typed property, if present and of the expected type.
    #[must_use]
    pub fn get_property<T: 'static>(&self, key: &str) -> Option<&T> {
        self.properties.get(key)?.downcast_ref::<T>()
    }

    /// Merges another context's properties into this one, replacing this
    /// context's values on key collision. Used by the controller to commit
    /// the winning attempt's properties onto the caller's context.
    pub(crate) fn upsert_properties_from(&mut self, other: &ResilienceContext) {
        for (key, value) in &other.properties {
            self.properties.insert(key.clone(), Arc::clone(value));
        }
    }

    /// Derives a per-attempt context: a child cancellation token linked to
    /// this context's token, a clone of the property bag, and an attempt
    /// tag so user code can observe which attempt it is running as.
    #[must_use]
    pub(crate) fn child(&self, kind: AttemptKind, index: usize) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
            properties: self.properties.clone(),
            continue_on_captured_context: self.continue_on_captured_context,
            attempt_tag: Some(AttemptTag { kind, index }),
        }
    }
}

impl Default for ResilienceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResilienceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilienceContext")
            .field("cancelled", &self.is_cancelled())
            .field("properties", &self.properties.len())
            .field("continue_on_captured_context", &self.continue_on_captured_context)
            .field("attempt_tag", &self.attempt_tag)
            .finish()
    }
}
