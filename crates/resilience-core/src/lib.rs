//! Core infrastructure shared by the resilience crates in this workspace.
//!
//! This crate provides the event system used for observability: a small
//! `ResilienceEvent`/`EventListener` convention that pattern crates (the
//! hedging execution core, and any future circuit-breaker, bulkhead, or
//! retry crates built on top of it) emit through without depending on a
//! concrete metrics or logging backend.

pub mod events;

pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
