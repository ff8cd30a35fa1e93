//! One-shot markers.
//!
//! `OneShot<T>` is a slot that can be filled once and never cleared; it is owned by a single
//! writer. `OneShotLatch` is the shareable variant for guarding an action such as signing.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneShot<T> {
    value: Option<T>,
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> OneShot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` if empty. Returns the rejected value when already filled.
    pub fn fill(&mut self, value: T) -> Result<(), T> {
        if self.value.is_some() {
            return Err(value);
        }
        self.value = Some(value);
        Ok(())
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct OneShotLatch {
    fired: AtomicBool,
}

impl OneShotLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once: for the first caller.
    pub fn try_fire(&self) -> bool {
        self.fired.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
