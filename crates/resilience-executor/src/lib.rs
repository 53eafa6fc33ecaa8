//! Executor abstraction for spawning futures.
//!
//! This crate exists so that code spawning concurrent tasks — the hedging
//! execution core, chiefly — doesn't have to hard-code `tokio::spawn`. Tests
//! can pin everything to a single-threaded executor, and callers with a
//! dedicated runtime (for CPU-bound or blocking work) can supply their own
//! `Handle` without the spawning code changing.
//!
//! # Example
//!
//! ```rust
//! use resilience_executor::{CurrentRuntime, Executor};
//!
//! # async fn example() {
//! let executor = CurrentRuntime::new();
//! let handle = executor.spawn(async { 42 });
//! assert_eq!(handle.await.unwrap(), 42);
//! # }
//! ```

mod executor;

pub use executor::{BlockingExecutor, CurrentRuntime, Executor};
