//! Process-wide library context.
//!
//! Embedders that want an explicit lifetime for the library acquire a
//! [`ContextGuard`] at the process boundary. The first acquisition
//! initializes the context; dropping the last guard tears it down. Handle
//! and value construction never touch this state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

#[derive(Debug)]
struct ContextState {
    guards: usize,
    generation: u64,
}

static STATE: Mutex<ContextState> = Mutex::new(ContextState {
    guards: 0,
    generation: 0,
});

fn state() -> MutexGuard<'static, ContextState> {
    // Counter updates never leave the state half-written.
    STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Entry point for the process-wide context.
#[derive(Debug)]
pub struct LibraryContext;

impl LibraryContext {
    /// Acquire the context, initializing it if no guard is live.
    pub fn acquire() -> ContextGuard {
        let mut state = state();
        if state.guards == 0 {
            state.generation += 1;
            info!(generation = state.generation, "library context initialized");
        }
        state.guards += 1;
        ContextGuard { _private: () }
    }

    /// Returns `true` while at least one guard is live.
    pub fn is_active() -> bool {
        state().guards > 0
    }

    /// Number of live guards.
    pub fn active_guards() -> usize {
        state().guards
    }

    /// How many times the context has been initialized in this process.
    pub fn generation() -> u64 {
        state().generation
    }
}

/// A live claim on the library context. Released on drop.
#[must_use = "the context is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    _private: (),
}

impl Clone for ContextGuard {
    fn clone(&self) -> Self {
        LibraryContext::acquire()
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let mut state = state();
        state.guards = state.guards.saturating_sub(1);
        if state.guards == 0 {
            info!(generation = state.generation, "library context torn down");
        }
    }
}
